use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::{TokenConfig, Vault};

#[derive(Accounts)]
pub struct ClearTokenConfig<'info> {
    #[account(mut)]
    pub gov: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
        constraint = token_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
        close = gov,
    )]
    pub token_config: Account<'info, TokenConfig>,
}

pub fn handler(ctx: Context<ClearTokenConfig>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let config = &ctx.accounts.token_config;

    vault.total_token_weights = vault
        .total_token_weights
        .checked_sub(config.weight)
        .ok_or(ErrorCode::MathUnderflow)?;
    vault.whitelisted_token_count = vault
        .whitelisted_token_count
        .checked_sub(1)
        .ok_or(ErrorCode::MathUnderflow)?;

    Ok(())
}
