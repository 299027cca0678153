use anchor_lang::prelude::*;

use crate::constants::BASIS_POINTS_DIVISOR;
use crate::error::ErrorCode;

/// A leveraged position, keyed by the PDA of
/// `[owner, collateral_mint, index_mint, is_long]`.
#[account]
#[derive(Default)]
pub struct Position {
    pub owner: Pubkey,
    pub collateral_mint: Pubkey,
    pub index_mint: Pubkey,
    pub is_long: bool,
    pub bump: u8,

    /// Notional size, USD at PRICE_PRECISION
    pub size: u128,
    /// Collateral value, USD at PRICE_PRECISION
    pub collateral: u128,
    pub average_price: u128,
    /// Snapshot of the collateral asset's cumulative funding rate
    pub entry_funding_rate: u128,
    /// Collateral-asset tokens earmarked from the pool for this position
    pub reserve_amount: u64,
    pub realised_pnl: i128,
    pub last_increased_time: i64,

    pub _reserved: [u8; 32],
}

impl Position {
    pub const LEN: usize = 8 // discriminator
        + 32  // owner
        + 32  // collateral_mint
        + 32  // index_mint
        + 1   // is_long
        + 1   // bump
        + 16  // size
        + 16  // collateral
        + 16  // average_price
        + 16  // entry_funding_rate
        + 8   // reserve_amount
        + 16  // realised_pnl
        + 8   // last_increased_time
        + 32; // reserved

    /// A position with size must carry collateral no larger than the size; an
    /// empty position must carry none.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            require!(self.collateral == 0, ErrorCode::SizeBelowCollateral);
            return Ok(());
        }
        require!(self.size >= self.collateral, ErrorCode::SizeBelowCollateral);
        Ok(())
    }

    /// Leverage in basis points (10_000 = 1x).
    pub fn get_leverage(&self) -> Result<u128> {
        require!(self.collateral > 0, ErrorCode::DivisionByZero);
        self.size
            .checked_mul(BASIS_POINTS_DIVISOR as u128)
            .ok_or(ErrorCode::MathOverflow)?
            .checked_div(self.collateral)
            .ok_or(error!(ErrorCode::DivisionByZero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;

    #[test]
    fn size_must_cover_collateral() {
        let mut position = Position {
            size: 100,
            collateral: 100,
            ..Default::default()
        };
        assert!(position.validate().is_ok());
        position.collateral = 101;
        assert!(position.validate().is_err());
        position.size = 0;
        position.collateral = 0;
        assert!(position.validate().is_ok());
    }

    #[test]
    fn leverage_in_basis_points() {
        let position = Position {
            size: 10_000 * PRICE_PRECISION,
            collateral: 1_000 * PRICE_PRECISION,
            ..Default::default()
        };
        assert_eq!(position.get_leverage().unwrap(), 100_000); // 10x
    }
}
