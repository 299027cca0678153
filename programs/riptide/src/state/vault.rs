use anchor_lang::prelude::*;

#[account]
#[derive(Default)]
pub struct Vault {
    pub gov: Pubkey,
    pub bump: u8,

    // Debt token wiring
    pub rusd_mint: Pubkey,
    pub rusd_token_account: Pubkey,
    /// Last observed balance of the vault's RUSD token account
    pub rusd_balance: u64,

    // Fee settings (basis points unless noted)
    pub tax_basis_points: u64,
    pub stable_tax_basis_points: u64,
    pub mint_burn_fee_basis_points: u64,
    pub swap_fee_basis_points: u64,
    pub stable_swap_fee_basis_points: u64,
    pub margin_fee_basis_points: u64,
    /// Flat fee paid to the liquidator, USD at PRICE_PRECISION
    pub liquidation_fee_usd: u128,
    /// Window after an increase during which small profits are floored to zero
    pub min_profit_time: i64,
    pub has_dynamic_fees: bool,

    // Funding settings
    pub funding_interval: i64,
    pub funding_rate_factor: u64,
    pub stable_funding_rate_factor: u64,

    /// Maximum leverage in basis points (10_000 = 1x)
    pub max_leverage: u64,
    /// Advisory priority-fee ceiling; not enforceable in-program
    pub max_gas_price: u64,

    // Mode flags
    pub in_manager_mode: bool,
    pub in_private_liquidation_mode: bool,
    pub is_swap_enabled: bool,
    pub is_leverage_enabled: bool,

    pub total_token_weights: u64,
    pub whitelisted_token_count: u64,

    pub _reserved: [u8; 32],
}

impl Vault {
    pub const LEN: usize = 8 // discriminator
        + 32  // gov
        + 1   // bump
        + 32  // rusd_mint
        + 32  // rusd_token_account
        + 8   // rusd_balance
        + 8 * 6 // fee bps
        + 16  // liquidation_fee_usd
        + 8   // min_profit_time
        + 1   // has_dynamic_fees
        + 8 * 3 // funding settings
        + 8   // max_leverage
        + 8   // max_gas_price
        + 1 * 4 // mode flags
        + 8 * 2 // totals
        + 32; // reserved
}
