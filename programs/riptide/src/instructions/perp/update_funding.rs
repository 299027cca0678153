use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::math::funding::update_cumulative_funding_rate;
use crate::state::{TokenConfig, Vault};

#[derive(Accounts)]
pub struct UpdateFunding<'info> {
    /// Anyone can crank funding accrual (permissionless)
    pub cranker: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
        constraint = token_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
    )]
    pub token_config: Account<'info, TokenConfig>,
}

pub fn handler(ctx: Context<UpdateFunding>) -> Result<()> {
    let clock = Clock::get()?;
    update_cumulative_funding_rate(
        &mut ctx.accounts.token_config,
        &ctx.accounts.vault,
        clock.unix_timestamp,
    )
}
