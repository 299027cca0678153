use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::VaultInitialized;
use crate::state::Vault;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeParams {
    pub liquidation_fee_usd: u128,
    pub funding_rate_factor: u64,
    pub stable_funding_rate_factor: u64,
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub gov: Signer<'info>,

    #[account(
        init,
        payer = gov,
        space = Vault::LEN,
        seeds = [VAULT_SEED],
        bump,
    )]
    pub vault: Account<'info, Vault>,

    /// The dollar-pegged debt token, minted and burned by the vault
    #[account(
        init,
        payer = gov,
        mint::decimals = RUSD_DECIMALS,
        mint::authority = vault,
    )]
    pub rusd_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = gov,
        associated_token::mint = rusd_mint,
        associated_token::authority = vault,
    )]
    pub vault_rusd_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    require!(
        params.liquidation_fee_usd <= MAX_LIQUIDATION_FEE_USD,
        ErrorCode::LiquidationFeeTooHigh
    );
    require!(
        params.funding_rate_factor <= MAX_FUNDING_RATE_FACTOR
            && params.stable_funding_rate_factor <= MAX_FUNDING_RATE_FACTOR,
        ErrorCode::FundingRateFactorTooHigh
    );

    let vault = &mut ctx.accounts.vault;
    vault.gov = ctx.accounts.gov.key();
    vault.bump = ctx.bumps.vault;
    vault.rusd_mint = ctx.accounts.rusd_mint.key();
    vault.rusd_token_account = ctx.accounts.vault_rusd_account.key();
    vault.rusd_balance = 0;

    vault.tax_basis_points = DEFAULT_TAX_BASIS_POINTS;
    vault.stable_tax_basis_points = DEFAULT_STABLE_TAX_BASIS_POINTS;
    vault.mint_burn_fee_basis_points = DEFAULT_MINT_BURN_FEE_BASIS_POINTS;
    vault.swap_fee_basis_points = DEFAULT_SWAP_FEE_BASIS_POINTS;
    vault.stable_swap_fee_basis_points = DEFAULT_STABLE_SWAP_FEE_BASIS_POINTS;
    vault.margin_fee_basis_points = DEFAULT_MARGIN_FEE_BASIS_POINTS;
    vault.liquidation_fee_usd = params.liquidation_fee_usd;
    vault.min_profit_time = 0;
    vault.has_dynamic_fees = false;

    vault.funding_interval = DEFAULT_FUNDING_INTERVAL;
    vault.funding_rate_factor = params.funding_rate_factor;
    vault.stable_funding_rate_factor = params.stable_funding_rate_factor;

    vault.max_leverage = DEFAULT_MAX_LEVERAGE;
    vault.max_gas_price = 0;

    vault.in_manager_mode = false;
    vault.in_private_liquidation_mode = false;
    vault.is_swap_enabled = true;
    vault.is_leverage_enabled = true;

    vault.total_token_weights = 0;
    vault.whitelisted_token_count = 0;
    vault._reserved = [0u8; 32];

    let clock = Clock::get()?;
    emit!(VaultInitialized {
        gov: vault.gov,
        rusd_mint: vault.rusd_mint,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
