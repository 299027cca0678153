use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::error::ErrorCode;

/// Compute `a * b / denominator` through a 256-bit intermediate.
/// Products of 1e30-scale prices with token amounts exceed u128.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, ErrorCode::DivisionByZero);
    let result = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(ErrorCode::MathOverflow)?
        / U256::from(denominator);
    require!(result <= U256::from(u128::MAX), ErrorCode::MathOverflow);
    Ok(result.as_u128())
}

/// Rescale `amount` from one decimal scale to another.
pub fn adjust_for_decimals(amount: u128, decimals_from: u8, decimals_to: u8) -> Result<u128> {
    mul_div(
        amount,
        10u128
            .checked_pow(decimals_to as u32)
            .ok_or(ErrorCode::MathOverflow)?,
        10u128
            .checked_pow(decimals_from as u32)
            .ok_or(ErrorCode::MathOverflow)?,
    )
}

/// Value of a token amount in USD at the asset's min price.
pub fn token_to_usd_min(amount: u64, min_price: u128, decimals: u8) -> Result<u128> {
    if amount == 0 {
        return Ok(0);
    }
    mul_div(
        amount as u128,
        min_price,
        10u128
            .checked_pow(decimals as u32)
            .ok_or(ErrorCode::MathOverflow)?,
    )
}

/// The smallest token amount worth `usd_amount`: priced at the asset's max
/// price.
pub fn usd_to_token_min(usd_amount: u128, max_price: u128, decimals: u8) -> Result<u64> {
    usd_to_token(usd_amount, max_price, decimals)
}

/// The largest token amount worth `usd_amount`: priced at the asset's min
/// price.
pub fn usd_to_token_max(usd_amount: u128, min_price: u128, decimals: u8) -> Result<u64> {
    usd_to_token(usd_amount, min_price, decimals)
}

pub fn usd_to_token(usd_amount: u128, price: u128, decimals: u8) -> Result<u64> {
    if usd_amount == 0 {
        return Ok(0);
    }
    let tokens = mul_div(
        usd_amount,
        10u128
            .checked_pow(decimals as u32)
            .ok_or(ErrorCode::MathOverflow)?,
        price,
    )?;
    u64::try_from(tokens).map_err(|_| ErrorCode::MathOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;

    const E30: u128 = PRICE_PRECISION;

    #[test]
    fn mul_div_survives_wide_products() {
        // 1e9 tokens at a 2000e30 price: the raw product is ~2e42
        let usd = mul_div(1_000_000_000, 2_000 * E30, 1_000_000_000).unwrap();
        assert_eq!(usd, 2_000 * E30);
        assert!(mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn decimal_rescale() {
        // 100 units at 6 decimals -> 9 decimals
        assert_eq!(
            adjust_for_decimals(100_000_000, 6, 9).unwrap(),
            100_000_000_000
        );
        assert_eq!(
            adjust_for_decimals(100_000_000_000, 9, 6).unwrap(),
            100_000_000
        );
    }

    #[test]
    fn token_usd_round_trip_loses_nothing_on_flat_price() {
        let price = 1_999 * E30;
        let usd = token_to_usd_min(1_000_000_000, price, 9).unwrap();
        assert_eq!(usd, 1_999 * E30);
        assert_eq!(usd_to_token_max(usd, price, 9).unwrap(), 1_000_000_000);
    }

    #[test]
    fn usd_to_token_sides() {
        // 10_000 USD of a 1999/2000 priced asset
        let usd = 10_000 * E30;
        let at_min = usd_to_token_max(usd, 1_999 * E30, 9).unwrap();
        let at_max = usd_to_token_min(usd, 2_000 * E30, 9).unwrap();
        assert!(at_min > at_max);
        assert_eq!(at_max, 5_000_000_000); // exactly 5 units
    }
}
