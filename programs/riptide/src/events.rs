use anchor_lang::prelude::*;

// Mint/redeem events
#[event]
pub struct BuyRusd {
    pub receiver: Pubkey,
    pub token: Pubkey,
    pub token_amount: u64,
    pub rusd_amount: u128,
    pub fee_basis_points: u64,
    pub timestamp: i64,
}

#[event]
pub struct SellRusd {
    pub receiver: Pubkey,
    pub token: Pubkey,
    pub rusd_amount: u128,
    pub token_amount: u64,
    pub fee_basis_points: u64,
    pub timestamp: i64,
}

#[event]
pub struct Swap {
    pub receiver: Pubkey,
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
    pub amount_out_after_fees: u64,
    pub fee_basis_points: u64,
    pub timestamp: i64,
}

#[event]
pub struct DirectPoolDeposit {
    pub token: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

// Position events
#[event]
pub struct IncreasePosition {
    pub key: Pubkey,
    pub account: Pubkey,
    pub collateral_token: Pubkey,
    pub index_token: Pubkey,
    pub collateral_delta: u128,
    pub size_delta: u128,
    pub is_long: bool,
    pub price: u128,
    pub fee: u128,
}

#[event]
pub struct DecreasePosition {
    pub key: Pubkey,
    pub account: Pubkey,
    pub collateral_token: Pubkey,
    pub index_token: Pubkey,
    pub collateral_delta: u128,
    pub size_delta: u128,
    pub is_long: bool,
    pub price: u128,
    pub fee: u128,
}

#[event]
pub struct LiquidatePosition {
    pub key: Pubkey,
    pub account: Pubkey,
    pub collateral_token: Pubkey,
    pub index_token: Pubkey,
    pub is_long: bool,
    pub size: u128,
    pub collateral: u128,
    pub reserve_amount: u64,
    pub realised_pnl: i128,
    pub mark_price: u128,
}

#[event]
pub struct UpdatePosition {
    pub key: Pubkey,
    pub size: u128,
    pub collateral: u128,
    pub average_price: u128,
    pub entry_funding_rate: u128,
    pub reserve_amount: u64,
    pub realised_pnl: i128,
    pub mark_price: u128,
}

#[event]
pub struct ClosePosition {
    pub key: Pubkey,
    pub size: u128,
    pub collateral: u128,
    pub average_price: u128,
    pub entry_funding_rate: u128,
    pub reserve_amount: u64,
    pub realised_pnl: i128,
}

#[event]
pub struct UpdatePnl {
    pub key: Pubkey,
    pub has_profit: bool,
    pub delta: u128,
}

// Funding
#[event]
pub struct UpdateFundingRate {
    pub token: Pubkey,
    pub cumulative_funding_rate: u128,
    pub timestamp: i64,
}

// Fee events
#[event]
pub struct CollectSwapFees {
    pub token: Pubkey,
    pub fee_usd: u128,
    pub fee_tokens: u64,
}

#[event]
pub struct CollectMarginFees {
    pub token: Pubkey,
    pub fee_usd: u128,
    pub fee_tokens: u64,
}

#[event]
pub struct WithdrawFees {
    pub token: Pubkey,
    pub amount: u64,
    pub receiver: Pubkey,
    pub timestamp: i64,
}

// Pool ledger events
#[event]
pub struct IncreasePoolAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[event]
pub struct DecreasePoolAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[event]
pub struct IncreaseRusdAmount {
    pub token: Pubkey,
    pub amount: u128,
}

#[event]
pub struct DecreaseRusdAmount {
    pub token: Pubkey,
    pub amount: u128,
}

#[event]
pub struct IncreaseReservedAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[event]
pub struct DecreaseReservedAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[event]
pub struct IncreaseGuaranteedUsd {
    pub token: Pubkey,
    pub amount: u128,
}

#[event]
pub struct DecreaseGuaranteedUsd {
    pub token: Pubkey,
    pub amount: u128,
}

// Admin events
#[event]
pub struct VaultInitialized {
    pub gov: Pubkey,
    pub rusd_mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct UpgradeVault {
    pub token: Pubkey,
    pub new_vault_token_account: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
