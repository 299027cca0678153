use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::math::oracle::read_price;
use crate::state::{TokenConfig, Vault};

/// Shared context for governance updates to a single token's configuration.
#[derive(Accounts)]
pub struct SetTokenParams<'info> {
    pub gov: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
    )]
    pub token_config: Account<'info, TokenConfig>,
}

pub fn set_buffer_amount(ctx: Context<SetTokenParams>, amount: u64) -> Result<()> {
    ctx.accounts.token_config.buffer_amount = amount;
    Ok(())
}

pub fn set_max_global_short_size(ctx: Context<SetTokenParams>, amount: u128) -> Result<()> {
    ctx.accounts.token_config.max_global_short_size = amount;
    Ok(())
}

/// Correct a token's recorded debt, routed through the capped/clamped
/// ledger primitives.
pub fn set_rusd_amount(ctx: Context<SetTokenParams>, amount: u128) -> Result<()> {
    let config = &mut ctx.accounts.token_config;
    let current = config.rusd_amount;
    if amount > current {
        config.increase_rusd_amount(amount - current)?;
    } else {
        config.decrease_rusd_amount(current - amount)?;
    }
    Ok(())
}

#[derive(Accounts)]
pub struct SetPriceFeed<'info> {
    pub gov: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
    )]
    pub token_config: Account<'info, TokenConfig>,

    /// CHECK: replacement price feed, validated in the handler
    pub oracle: UncheckedAccount<'info>,
}

pub fn set_price_feed(ctx: Context<SetPriceFeed>) -> Result<()> {
    let clock = Clock::get()?;
    read_price(&ctx.accounts.oracle.to_account_info(), &clock)?.max_price()?;
    ctx.accounts.token_config.oracle = ctx.accounts.oracle.key();
    Ok(())
}
