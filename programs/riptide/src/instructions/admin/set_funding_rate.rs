use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::Vault;

#[derive(Accounts)]
pub struct SetFundingRate<'info> {
    pub gov: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,
}

pub fn handler(
    ctx: Context<SetFundingRate>,
    funding_interval: i64,
    funding_rate_factor: u64,
    stable_funding_rate_factor: u64,
) -> Result<()> {
    require!(
        funding_interval >= MIN_FUNDING_RATE_INTERVAL,
        ErrorCode::FundingIntervalTooShort
    );
    require!(
        funding_rate_factor <= MAX_FUNDING_RATE_FACTOR
            && stable_funding_rate_factor <= MAX_FUNDING_RATE_FACTOR,
        ErrorCode::FundingRateFactorTooHigh
    );

    let vault = &mut ctx.accounts.vault;
    vault.funding_interval = funding_interval;
    vault.funding_rate_factor = funding_rate_factor;
    vault.stable_funding_rate_factor = stable_funding_rate_factor;

    Ok(())
}
