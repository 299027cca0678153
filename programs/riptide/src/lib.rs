#![allow(ambiguous_glob_reexports)]

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

#[cfg(test)]
mod flows_test;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("E7sBwstSFu2sSx5UjP9Bm6dDRRQbxDXoVcmVzjC1nuVg");

#[program]
pub mod riptide {
    use super::*;

    // ── Governance ──────────────────────────────────────────

    pub fn initialize(
        ctx: Context<Initialize>,
        params: instructions::admin::initialize::InitializeParams,
    ) -> Result<()> {
        instructions::admin::initialize::handler(ctx, params)
    }

    pub fn set_gov(ctx: Context<SetVaultConfig>, new_gov: Pubkey) -> Result<()> {
        instructions::admin::set_vault_config::set_gov(ctx, new_gov)
    }

    pub fn set_fees(
        ctx: Context<SetFees>,
        params: instructions::admin::set_fees::SetFeesParams,
    ) -> Result<()> {
        instructions::admin::set_fees::handler(ctx, params)
    }

    pub fn set_funding_rate(
        ctx: Context<SetFundingRate>,
        funding_interval: i64,
        funding_rate_factor: u64,
        stable_funding_rate_factor: u64,
    ) -> Result<()> {
        instructions::admin::set_funding_rate::handler(
            ctx,
            funding_interval,
            funding_rate_factor,
            stable_funding_rate_factor,
        )
    }

    pub fn set_token_config(
        ctx: Context<SetTokenConfig>,
        params: instructions::admin::set_token_config::SetTokenConfigParams,
    ) -> Result<()> {
        instructions::admin::set_token_config::handler(ctx, params)
    }

    pub fn clear_token_config(ctx: Context<ClearTokenConfig>) -> Result<()> {
        instructions::admin::clear_token_config::handler(ctx)
    }

    pub fn set_price_feed(ctx: Context<SetPriceFeed>) -> Result<()> {
        instructions::admin::set_token_params::set_price_feed(ctx)
    }

    pub fn set_buffer_amount(ctx: Context<SetTokenParams>, amount: u64) -> Result<()> {
        instructions::admin::set_token_params::set_buffer_amount(ctx, amount)
    }

    pub fn set_max_global_short_size(ctx: Context<SetTokenParams>, amount: u128) -> Result<()> {
        instructions::admin::set_token_params::set_max_global_short_size(ctx, amount)
    }

    pub fn set_rusd_amount(ctx: Context<SetTokenParams>, amount: u128) -> Result<()> {
        instructions::admin::set_token_params::set_rusd_amount(ctx, amount)
    }

    pub fn set_max_leverage(ctx: Context<SetVaultConfig>, max_leverage: u64) -> Result<()> {
        instructions::admin::set_vault_config::set_max_leverage(ctx, max_leverage)
    }

    pub fn set_max_gas_price(ctx: Context<SetVaultConfig>, max_gas_price: u64) -> Result<()> {
        instructions::admin::set_vault_config::set_max_gas_price(ctx, max_gas_price)
    }

    pub fn set_in_manager_mode(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
        instructions::admin::set_vault_config::set_in_manager_mode(ctx, enabled)
    }

    pub fn set_in_private_liquidation_mode(
        ctx: Context<SetVaultConfig>,
        enabled: bool,
    ) -> Result<()> {
        instructions::admin::set_vault_config::set_in_private_liquidation_mode(ctx, enabled)
    }

    pub fn set_is_swap_enabled(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
        instructions::admin::set_vault_config::set_is_swap_enabled(ctx, enabled)
    }

    pub fn set_is_leverage_enabled(ctx: Context<SetVaultConfig>, enabled: bool) -> Result<()> {
        instructions::admin::set_vault_config::set_is_leverage_enabled(ctx, enabled)
    }

    pub fn set_manager(ctx: Context<SetManager>, active: bool) -> Result<()> {
        instructions::admin::set_permission::set_manager(ctx, active)
    }

    pub fn set_liquidator(ctx: Context<SetLiquidator>, active: bool) -> Result<()> {
        instructions::admin::set_permission::set_liquidator(ctx, active)
    }

    pub fn approve_router(ctx: Context<ApproveRouter>, active: bool) -> Result<()> {
        instructions::admin::set_permission::approve_router(ctx, active)
    }

    pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
        instructions::admin::withdraw_fees::handler(ctx)
    }

    pub fn upgrade_vault(ctx: Context<UpgradeVault>, amount: u64) -> Result<()> {
        instructions::admin::upgrade_vault::handler(ctx, amount)
    }

    // ── Liquidity ───────────────────────────────────────────

    pub fn direct_pool_deposit(ctx: Context<DirectPoolDeposit>, amount: u64) -> Result<()> {
        instructions::liquidity::direct_pool_deposit::handler(ctx, amount)
    }

    pub fn buy_rusd(ctx: Context<BuyRusd>, amount: u64) -> Result<()> {
        instructions::liquidity::buy_rusd::handler(ctx, amount)
    }

    pub fn sell_rusd(ctx: Context<SellRusd>, amount: u64) -> Result<()> {
        instructions::liquidity::sell_rusd::handler(ctx, amount)
    }

    pub fn swap(ctx: Context<ExecuteSwap>, amount: u64) -> Result<()> {
        instructions::liquidity::swap::handler(ctx, amount)
    }

    // ── Positions ───────────────────────────────────────────

    pub fn increase_position(
        ctx: Context<IncreasePosition>,
        params: instructions::perp::increase_position::IncreasePositionParams,
    ) -> Result<()> {
        instructions::perp::increase_position::handler(ctx, params)
    }

    pub fn decrease_position(
        ctx: Context<DecreasePosition>,
        params: instructions::perp::decrease_position::DecreasePositionParams,
    ) -> Result<()> {
        instructions::perp::decrease_position::handler(ctx, params)
    }

    pub fn liquidate_position(ctx: Context<LiquidatePositionCtx>) -> Result<()> {
        instructions::perp::liquidate_position::handler(ctx)
    }

    pub fn update_funding(ctx: Context<UpdateFunding>) -> Result<()> {
        instructions::perp::update_funding::handler(ctx)
    }
}
