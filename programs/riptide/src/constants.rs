use anchor_lang::prelude::*;

// PDA Seeds
#[constant]
pub const VAULT_SEED: &[u8] = b"vault";
#[constant]
pub const TOKEN_CONFIG_SEED: &[u8] = b"token_config";
#[constant]
pub const POSITION_SEED: &[u8] = b"position";
#[constant]
pub const MANAGER_SEED: &[u8] = b"manager";
#[constant]
pub const LIQUIDATOR_SEED: &[u8] = b"liquidator";
#[constant]
pub const ROUTER_SEED: &[u8] = b"router";

// Prices and USD values are fixed-point at 1e30
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000;

// Funding rates are fixed-point at 1e6
pub const FUNDING_RATE_PRECISION: u128 = 1_000_000;

// Basis points denominator
pub const BASIS_POINTS_DIVISOR: u64 = 10_000;

// RUSD mint decimals (SPL amounts are u64, so the dollar token uses the
// conventional 9 decimals rather than an 18-decimal scale)
pub const RUSD_DECIMALS: u8 = 9;

// Fee limits (basis points unless noted)
pub const MAX_FEE_BASIS_POINTS: u64 = 500; // 5%
pub const MAX_LIQUIDATION_FEE_USD: u128 = 100 * PRICE_PRECISION;

// Leverage is expressed in basis points: 10_000 = 1x
pub const MIN_LEVERAGE: u64 = 10_000;
pub const DEFAULT_MAX_LEVERAGE: u64 = 50 * 10_000;

// Funding rate limits
pub const MIN_FUNDING_RATE_INTERVAL: i64 = 3_600; // 1 hour in seconds
pub const DEFAULT_FUNDING_INTERVAL: i64 = 8 * 3_600;
pub const MAX_FUNDING_RATE_FACTOR: u64 = 10_000; // 1% per interval at full utilisation

// Default fees, set at initialization and adjustable by governance
pub const DEFAULT_TAX_BASIS_POINTS: u64 = 50;
pub const DEFAULT_STABLE_TAX_BASIS_POINTS: u64 = 20;
pub const DEFAULT_MINT_BURN_FEE_BASIS_POINTS: u64 = 30;
pub const DEFAULT_SWAP_FEE_BASIS_POINTS: u64 = 30;
pub const DEFAULT_STABLE_SWAP_FEE_BASIS_POINTS: u64 = 4;
pub const DEFAULT_MARGIN_FEE_BASIS_POINTS: u64 = 10;

// Oracle
pub const MAX_ORACLE_STALENESS: i64 = 60; // seconds
