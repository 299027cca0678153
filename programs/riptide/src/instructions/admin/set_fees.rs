use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::Vault;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct SetFeesParams {
    pub tax_basis_points: u64,
    pub stable_tax_basis_points: u64,
    pub mint_burn_fee_basis_points: u64,
    pub swap_fee_basis_points: u64,
    pub stable_swap_fee_basis_points: u64,
    pub margin_fee_basis_points: u64,
    pub liquidation_fee_usd: u128,
    pub min_profit_time: i64,
    pub has_dynamic_fees: bool,
}

#[derive(Accounts)]
pub struct SetFees<'info> {
    pub gov: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,
}

pub fn handler(ctx: Context<SetFees>, params: SetFeesParams) -> Result<()> {
    require!(
        params.tax_basis_points <= MAX_FEE_BASIS_POINTS
            && params.stable_tax_basis_points <= MAX_FEE_BASIS_POINTS
            && params.mint_burn_fee_basis_points <= MAX_FEE_BASIS_POINTS
            && params.swap_fee_basis_points <= MAX_FEE_BASIS_POINTS
            && params.stable_swap_fee_basis_points <= MAX_FEE_BASIS_POINTS
            && params.margin_fee_basis_points <= MAX_FEE_BASIS_POINTS,
        ErrorCode::FeeExceedsMaximum
    );
    require!(
        params.liquidation_fee_usd <= MAX_LIQUIDATION_FEE_USD,
        ErrorCode::LiquidationFeeTooHigh
    );

    let vault = &mut ctx.accounts.vault;
    vault.tax_basis_points = params.tax_basis_points;
    vault.stable_tax_basis_points = params.stable_tax_basis_points;
    vault.mint_burn_fee_basis_points = params.mint_burn_fee_basis_points;
    vault.swap_fee_basis_points = params.swap_fee_basis_points;
    vault.stable_swap_fee_basis_points = params.stable_swap_fee_basis_points;
    vault.margin_fee_basis_points = params.margin_fee_basis_points;
    vault.liquidation_fee_usd = params.liquidation_fee_usd;
    vault.min_profit_time = params.min_profit_time;
    vault.has_dynamic_fees = params.has_dynamic_fees;

    Ok(())
}
