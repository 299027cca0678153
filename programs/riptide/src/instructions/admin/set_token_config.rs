use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::math::oracle::read_price;
use crate::state::{TokenConfig, Vault};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct SetTokenConfigParams {
    pub weight: u64,
    pub min_profit_basis_points: u64,
    pub max_rusd_amount: u128,
    pub is_stable: bool,
    pub is_shortable: bool,
}

#[derive(Accounts)]
pub struct SetTokenConfig<'info> {
    #[account(mut)]
    pub gov: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    pub mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = gov,
        space = TokenConfig::LEN,
        seeds = [TOKEN_CONFIG_SEED, mint.key().as_ref()],
        bump,
    )]
    pub token_config: Account<'info, TokenConfig>,

    /// CHECK: price feed for the asset, parsed and validated in the handler
    pub oracle: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = gov,
        associated_token::mint = mint,
        associated_token::authority = vault,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<SetTokenConfig>, params: SetTokenConfigParams) -> Result<()> {
    let clock = Clock::get()?;

    // confirm the oracle wiring answers with a usable max price
    let price = read_price(&ctx.accounts.oracle.to_account_info(), &clock)?;
    price.max_price()?;

    let vault = &mut ctx.accounts.vault;
    let config = &mut ctx.accounts.token_config;

    if !config.whitelisted {
        vault.whitelisted_token_count = vault
            .whitelisted_token_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
    } else {
        // updating: retire the old weight before adding the new one
        vault.total_token_weights = vault
            .total_token_weights
            .checked_sub(config.weight)
            .ok_or(ErrorCode::MathUnderflow)?;
    }
    vault.total_token_weights = vault
        .total_token_weights
        .checked_add(params.weight)
        .ok_or(ErrorCode::MathOverflow)?;

    config.mint = ctx.accounts.mint.key();
    config.oracle = ctx.accounts.oracle.key();
    config.token_account = ctx.accounts.vault_token_account.key();
    config.bump = ctx.bumps.token_config;
    config.whitelisted = true;
    config.decimals = ctx.accounts.mint.decimals;
    config.weight = params.weight;
    config.min_profit_basis_points = params.min_profit_basis_points;
    config.max_rusd_amount = params.max_rusd_amount;
    config.is_stable = params.is_stable;
    config.is_shortable = params.is_shortable;

    Ok(())
}
