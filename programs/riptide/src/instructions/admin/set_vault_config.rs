use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::Vault;

/// Shared context for the small governance toggles.
#[derive(Accounts)]
pub struct SetVaultConfig<'info> {
    pub gov: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,
}

pub fn set_gov(ctx: Context<SetVaultConfig>, new_gov: Pubkey) -> Result<()> {
    ctx.accounts.vault.gov = new_gov;
    Ok(())
}

pub fn set_in_manager_mode(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
    ctx.accounts.vault.in_manager_mode = enabled;
    Ok(())
}

pub fn set_in_private_liquidation_mode(
    ctx: Context<SetVaultConfig>,
    enabled: bool,
) -> Result<()> {
    ctx.accounts.vault.in_private_liquidation_mode = enabled;
    Ok(())
}

pub fn set_is_swap_enabled(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
    ctx.accounts.vault.is_swap_enabled = enabled;
    Ok(())
}

pub fn set_is_leverage_enabled(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
    ctx.accounts.vault.is_leverage_enabled = enabled;
    Ok(())
}

pub fn set_max_leverage(ctx: Context<SetVaultConfig>, max_leverage: u64) -> Result<()> {
    require!(max_leverage > MIN_LEVERAGE, ErrorCode::MaxLeverageTooLow);
    ctx.accounts.vault.max_leverage = max_leverage;
    Ok(())
}

pub fn set_max_gas_price(ctx: Context<SetVaultConfig>, max_gas_price: u64) -> Result<()> {
    ctx.accounts.vault.max_gas_price = max_gas_price;
    Ok(())
}
