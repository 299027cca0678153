use anchor_lang::prelude::*;

use crate::constants::{BASIS_POINTS_DIVISOR, PRICE_PRECISION, RUSD_DECIMALS};
use crate::error::ErrorCode;
use crate::events::*;
use crate::math::fees::{get_funding_fee, get_position_fee};
use crate::math::fixed_point::{adjust_for_decimals, mul_div, token_to_usd_min, usd_to_token_min};

/// Per-asset configuration plus the pool ledger backing swaps, debt issuance
/// and leveraged positions against that asset.
#[account]
#[derive(Default)]
pub struct TokenConfig {
    pub mint: Pubkey,
    pub oracle: Pubkey,
    /// The vault's custodial token account for this asset
    pub token_account: Pubkey,
    pub bump: u8,

    pub whitelisted: bool,
    pub decimals: u8,
    pub weight: u64,
    pub min_profit_basis_points: u64,
    /// Debt ceiling in RUSD units; 0 means uncapped
    pub max_rusd_amount: u128,
    /// Pool floor enforced on every pool decrement
    pub buffer_amount: u64,
    pub is_stable: bool,
    pub is_shortable: bool,
    /// Cap on aggregate short size against this index, USD; 0 means uncapped
    pub max_global_short_size: u128,

    // Ledger
    /// Last observed custodial balance, used to derive inbound deltas
    pub token_balance: u64,
    /// Tokens backing swaps and leveraged liquidity
    pub pool_amount: u64,
    /// Tokens locked for open positions' potential payouts
    pub reserved_amount: u64,
    /// RUSD minted against this asset
    pub rusd_amount: u128,
    /// Sum of (size - collateral) across long positions collateralized here
    pub guaranteed_usd: u128,
    /// Accumulated fees in this asset's units
    pub fee_reserves: u64,
    pub cumulative_funding_rate: u128,
    pub last_funding_time: i64,

    // Aggregate short book when this asset is the index
    pub global_short_size: u128,
    pub global_short_average_price: u128,

    pub _reserved: [u8; 32],
}

impl TokenConfig {
    pub const LEN: usize = 8 // discriminator
        + 32  // mint
        + 32  // oracle
        + 32  // token_account
        + 1   // bump
        + 1   // whitelisted
        + 1   // decimals
        + 8   // weight
        + 8   // min_profit_basis_points
        + 16  // max_rusd_amount
        + 8   // buffer_amount
        + 1   // is_stable
        + 1   // is_shortable
        + 16  // max_global_short_size
        + 8   // token_balance
        + 8   // pool_amount
        + 8   // reserved_amount
        + 16  // rusd_amount
        + 16  // guaranteed_usd
        + 8   // fee_reserves
        + 16  // cumulative_funding_rate
        + 8   // last_funding_time
        + 16  // global_short_size
        + 16  // global_short_average_price
        + 32; // reserved

    // ── Pool ledger primitives ──────────────────────────────
    //
    // Each primitive performs its arithmetic, re-checks the ledger
    // invariants and emits the corresponding record.

    /// `balance` is the actual custodial token account balance; the pool can
    /// never exceed what the vault actually holds.
    pub fn increase_pool_amount(&mut self, amount: u64, balance: u64) -> Result<()> {
        self.pool_amount = self
            .pool_amount
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        require!(self.pool_amount <= balance, ErrorCode::PoolExceedsBalance);
        emit!(IncreasePoolAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    pub fn decrease_pool_amount(&mut self, amount: u64) -> Result<()> {
        self.pool_amount = self
            .pool_amount
            .checked_sub(amount)
            .ok_or(ErrorCode::InsufficientPoolAmount)?;
        require!(
            self.reserved_amount <= self.pool_amount,
            ErrorCode::ReservedExceedsPool
        );
        require!(
            self.pool_amount >= self.buffer_amount,
            ErrorCode::PoolBelowBuffer
        );
        emit!(DecreasePoolAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    pub fn increase_reserved_amount(&mut self, amount: u64) -> Result<()> {
        self.reserved_amount = self
            .reserved_amount
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        require!(
            self.reserved_amount <= self.pool_amount,
            ErrorCode::ReservedExceedsPool
        );
        emit!(IncreaseReservedAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    pub fn decrease_reserved_amount(&mut self, amount: u64) -> Result<()> {
        self.reserved_amount = self
            .reserved_amount
            .checked_sub(amount)
            .ok_or(ErrorCode::InsufficientReserve)?;
        emit!(DecreaseReservedAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    pub fn increase_rusd_amount(&mut self, amount: u128) -> Result<()> {
        self.rusd_amount = self
            .rusd_amount
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        if self.max_rusd_amount != 0 {
            require!(
                self.rusd_amount <= self.max_rusd_amount,
                ErrorCode::RusdCapExceeded
            );
        }
        emit!(IncreaseRusdAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    /// Debt may legitimately over-decrement when minted against one asset and
    /// redeemed against another; it is clamped at zero per asset.
    pub fn decrease_rusd_amount(&mut self, amount: u128) -> Result<()> {
        let value = self.rusd_amount;
        if value <= amount {
            self.rusd_amount = 0;
            emit!(DecreaseRusdAmount {
                token: self.mint,
                amount: value,
            });
            return Ok(());
        }
        self.rusd_amount = value - amount;
        emit!(DecreaseRusdAmount {
            token: self.mint,
            amount,
        });
        Ok(())
    }

    pub fn increase_guaranteed_usd(&mut self, usd_amount: u128) -> Result<()> {
        self.guaranteed_usd = self
            .guaranteed_usd
            .checked_add(usd_amount)
            .ok_or(ErrorCode::MathOverflow)?;
        emit!(IncreaseGuaranteedUsd {
            token: self.mint,
            amount: usd_amount,
        });
        Ok(())
    }

    pub fn decrease_guaranteed_usd(&mut self, usd_amount: u128) -> Result<()> {
        self.guaranteed_usd = self
            .guaranteed_usd
            .checked_sub(usd_amount)
            .ok_or(ErrorCode::InsufficientGuaranteedUsd)?;
        emit!(DecreaseGuaranteedUsd {
            token: self.mint,
            amount: usd_amount,
        });
        Ok(())
    }

    pub fn increase_global_short_size(&mut self, usd_amount: u128) -> Result<()> {
        self.global_short_size = self
            .global_short_size
            .checked_add(usd_amount)
            .ok_or(ErrorCode::MathOverflow)?;
        if self.max_global_short_size != 0 {
            require!(
                self.global_short_size <= self.max_global_short_size,
                ErrorCode::MaxGlobalShortsExceeded
            );
        }
        Ok(())
    }

    pub fn decrease_global_short_size(&mut self, usd_amount: u128) {
        self.global_short_size = self.global_short_size.saturating_sub(usd_amount);
    }

    // ── Fee collection ──────────────────────────────────────

    /// Retains `fee_basis_points` of `amount` in this asset's fee reserve and
    /// returns the remainder. `min_price` is only used to value the fee for
    /// the emitted record.
    pub fn collect_swap_fees(
        &mut self,
        amount: u64,
        fee_basis_points: u64,
        min_price: u128,
    ) -> Result<u64> {
        let after_fee = (amount as u128)
            .checked_mul((BASIS_POINTS_DIVISOR - fee_basis_points) as u128)
            .ok_or(ErrorCode::MathOverflow)?
            .checked_div(BASIS_POINTS_DIVISOR as u128)
            .ok_or(ErrorCode::DivisionByZero)? as u64;
        let fee_amount = amount
            .checked_sub(after_fee)
            .ok_or(ErrorCode::MathUnderflow)?;
        self.fee_reserves = self
            .fee_reserves
            .checked_add(fee_amount)
            .ok_or(ErrorCode::MathOverflow)?;
        emit!(CollectSwapFees {
            token: self.mint,
            fee_usd: token_to_usd_min(fee_amount, min_price, self.decimals)?,
            fee_tokens: fee_amount,
        });
        Ok(after_fee)
    }

    /// Charges the position fee on `size_delta` plus the funding fee accrued
    /// on `size` since `entry_funding_rate`, retained in this asset's units at
    /// its max price. Returns the total fee in USD.
    pub fn collect_margin_fees(
        &mut self,
        size_delta: u128,
        size: u128,
        entry_funding_rate: u128,
        margin_fee_basis_points: u64,
        max_price: u128,
    ) -> Result<u128> {
        let mut fee_usd = get_position_fee(size_delta, margin_fee_basis_points)?;
        let funding_fee = get_funding_fee(size, self.cumulative_funding_rate, entry_funding_rate)?;
        fee_usd = fee_usd
            .checked_add(funding_fee)
            .ok_or(ErrorCode::MathOverflow)?;

        let fee_tokens = usd_to_token_min(fee_usd, max_price, self.decimals)?;
        self.fee_reserves = self
            .fee_reserves
            .checked_add(fee_tokens)
            .ok_or(ErrorCode::MathOverflow)?;
        emit!(CollectMarginFees {
            token: self.mint,
            fee_usd,
            fee_tokens,
        });
        Ok(fee_usd)
    }

    /// Resyncs the recorded custodial balance to the actual one.
    pub fn update_token_balance(&mut self, balance: u64) {
        self.token_balance = balance;
    }

    /// Tokens returned when redeeming `rusd_amount` of debt against this
    /// asset at its max price.
    pub fn get_redemption_amount(&self, rusd_amount: u128, max_price: u128) -> Result<u64> {
        let token_amount = adjust_for_decimals(
            mul_div(rusd_amount, PRICE_PRECISION, max_price)?,
            RUSD_DECIMALS,
            self.decimals,
        )?;
        u64::try_from(token_amount).map_err(|_| ErrorCode::MathOverflow.into())
    }

    /// The collateral actually redeemable against this asset: for stables the
    /// whole pool; otherwise the pool net of position reserves, plus the
    /// guaranteed USD longs owe, valued in tokens.
    pub fn get_redemption_collateral(&self, max_price: u128) -> Result<u64> {
        if self.is_stable {
            return Ok(self.pool_amount);
        }
        let guaranteed_tokens = usd_to_token_min(self.guaranteed_usd, max_price, self.decimals)?;
        guaranteed_tokens
            .checked_add(self.pool_amount)
            .ok_or(ErrorCode::MathOverflow)?
            .checked_sub(self.reserved_amount)
            .ok_or(ErrorCode::MathUnderflow.into())
    }

    pub fn get_redemption_collateral_usd(
        &self,
        max_price: u128,
        min_price: u128,
    ) -> Result<u128> {
        token_to_usd_min(
            self.get_redemption_collateral(max_price)?,
            min_price,
            self.decimals,
        )
    }

    /// Reserved-to-pool ratio at FUNDING_RATE_PRECISION.
    pub fn get_utilisation(&self) -> Result<u128> {
        if self.pool_amount == 0 {
            return Ok(0);
        }
        (self.reserved_amount as u128)
            .checked_mul(crate::constants::FUNDING_RATE_PRECISION)
            .ok_or(ErrorCode::MathOverflow)?
            .checked_div(self.pool_amount as u128)
            .ok_or(error!(ErrorCode::DivisionByZero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig {
            decimals: 6,
            whitelisted: true,
            ..Default::default()
        }
    }

    #[test]
    fn pool_cannot_exceed_custodial_balance() {
        let mut cfg = config();
        assert!(cfg.increase_pool_amount(1_000, 1_000).is_ok());
        assert_eq!(cfg.pool_amount, 1_000);
        assert!(cfg.increase_pool_amount(1, 1_000).is_err());
    }

    #[test]
    fn pool_decrement_respects_reserved_and_buffer() {
        let mut cfg = config();
        cfg.increase_pool_amount(1_000, 1_000).unwrap();
        cfg.increase_reserved_amount(600).unwrap();
        // 1000 - 500 would leave pool below reserved
        assert!(cfg.decrease_pool_amount(500).is_err());

        let mut cfg = config();
        cfg.buffer_amount = 900;
        cfg.increase_pool_amount(1_000, 1_000).unwrap();
        assert!(cfg.decrease_pool_amount(200).is_err());
        assert!(cfg.decrease_pool_amount(100).is_ok());
        assert_eq!(cfg.pool_amount, 900);
    }

    #[test]
    fn reserved_cannot_exceed_pool() {
        let mut cfg = config();
        cfg.increase_pool_amount(100, 100).unwrap();
        assert!(cfg.increase_reserved_amount(101).is_err());
        assert!(cfg.increase_reserved_amount(100).is_ok());
        assert!(cfg.decrease_reserved_amount(101).is_err());
        assert!(cfg.decrease_reserved_amount(100).is_ok());
        assert_eq!(cfg.reserved_amount, 0);
    }

    #[test]
    fn rusd_amount_capped_and_clamped() {
        let mut cfg = config();
        cfg.max_rusd_amount = 500;
        assert!(cfg.increase_rusd_amount(400).is_ok());
        assert!(cfg.increase_rusd_amount(200).is_err());

        // decrement clamps at zero rather than underflowing
        let mut cfg = config();
        cfg.increase_rusd_amount(100).unwrap();
        cfg.decrease_rusd_amount(250).unwrap();
        assert_eq!(cfg.rusd_amount, 0);
    }

    #[test]
    fn global_short_cap_enforced() {
        let mut cfg = config();
        cfg.max_global_short_size = 1_000;
        assert!(cfg.increase_global_short_size(800).is_ok());
        assert!(cfg.increase_global_short_size(300).is_err());
        cfg.decrease_global_short_size(2_000);
        assert_eq!(cfg.global_short_size, 0);
    }

    #[test]
    fn swap_fee_retained_in_reserves() {
        let mut cfg = config();
        // scenario: 100 USDC in at 30 bps
        let after = cfg
            .collect_swap_fees(100_000_000, 30, crate::constants::PRICE_PRECISION)
            .unwrap();
        assert_eq!(after, 99_700_000);
        assert_eq!(cfg.fee_reserves, 300_000);
    }

    #[test]
    fn redemption_amount_at_max_price() {
        let cfg = config();
        // 99.7 RUSD (9 decimals) against a 1.00 USD stable with 6 decimals
        let out = cfg
            .get_redemption_amount(99_700_000_000, crate::constants::PRICE_PRECISION)
            .unwrap();
        assert_eq!(out, 99_700_000);
    }

    #[test]
    fn redemption_collateral_nets_out_reserves() {
        let mut cfg = config();
        cfg.decimals = 9;
        cfg.pool_amount = 10_000_000_000;
        cfg.reserved_amount = 4_000_000_000;
        cfg.guaranteed_usd = 2_000 * crate::constants::PRICE_PRECISION;
        let max_price = 2_000 * crate::constants::PRICE_PRECISION;
        // guaranteed converts to exactly 1 token at 2000
        assert_eq!(
            cfg.get_redemption_collateral(max_price).unwrap(),
            1_000_000_000 + 10_000_000_000 - 4_000_000_000
        );
        // stables redeem the whole pool
        cfg.is_stable = true;
        assert_eq!(
            cfg.get_redemption_collateral(max_price).unwrap(),
            10_000_000_000
        );
    }

    #[test]
    fn utilisation_is_reserved_over_pool() {
        let mut cfg = config();
        cfg.increase_pool_amount(1_000, 1_000).unwrap();
        cfg.increase_reserved_amount(250).unwrap();
        assert_eq!(cfg.get_utilisation().unwrap(), 250_000);
    }
}
