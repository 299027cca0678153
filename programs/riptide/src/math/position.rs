use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::constants::BASIS_POINTS_DIVISOR;
use crate::error::ErrorCode;
use crate::math::fixed_point::mul_div;

/// PnL of a position at `mark_price` against its `average_price`.
/// Returns `(has_profit, delta)` in USD.
///
/// Profits below the index's min-profit threshold are floored to zero for
/// `min_profit_time` after the last increase, blunting single-block
/// oracle-edge round trips.
pub fn get_delta(
    size: u128,
    average_price: u128,
    mark_price: u128,
    is_long: bool,
    last_increased_time: i64,
    min_profit_basis_points: u64,
    min_profit_time: i64,
    now: i64,
) -> Result<(bool, u128)> {
    require!(average_price > 0, ErrorCode::InvalidAveragePrice);
    let price_delta = average_price.abs_diff(mark_price);
    let mut delta = mul_div(size, price_delta, average_price)?;

    let has_profit = if is_long {
        mark_price > average_price
    } else {
        average_price > mark_price
    };

    let min_bps = if now > last_increased_time + min_profit_time {
        0
    } else {
        min_profit_basis_points
    };
    if has_profit
        && U256::from(delta) * U256::from(BASIS_POINTS_DIVISOR)
            <= U256::from(size) * U256::from(min_bps)
    {
        delta = 0;
    }

    Ok((has_profit, delta))
}

/// Recompute the average price when a position grows, so unrealized PnL at
/// the current mark carries over: for longs the divisor is
/// `next_size ± delta` (+ on profit), for shorts the sign flips.
#[allow(clippy::too_many_arguments)]
pub fn get_next_average_price(
    size: u128,
    average_price: u128,
    mark_price: u128,
    is_long: bool,
    size_delta: u128,
    last_increased_time: i64,
    min_profit_basis_points: u64,
    min_profit_time: i64,
    now: i64,
) -> Result<u128> {
    let (has_profit, delta) = get_delta(
        size,
        average_price,
        mark_price,
        is_long,
        last_increased_time,
        min_profit_basis_points,
        min_profit_time,
        now,
    )?;
    let next_size = size
        .checked_add(size_delta)
        .ok_or(ErrorCode::MathOverflow)?;
    let divisor = if is_long == has_profit {
        next_size.checked_add(delta).ok_or(ErrorCode::MathOverflow)?
    } else {
        next_size.checked_sub(delta).ok_or(ErrorCode::MathUnderflow)?
    };
    mul_div(mark_price, next_size, divisor)
}

/// The short-book analogue of `get_next_average_price`, over the aggregate
/// short size and average price for an index asset.
pub fn get_next_global_short_average_price(
    global_short_size: u128,
    global_short_average_price: u128,
    next_price: u128,
    size_delta: u128,
) -> Result<u128> {
    let price_delta = global_short_average_price.abs_diff(next_price);
    let delta = mul_div(global_short_size, price_delta, global_short_average_price)?;
    let has_profit = global_short_average_price > next_price;

    let next_size = global_short_size
        .checked_add(size_delta)
        .ok_or(ErrorCode::MathOverflow)?;
    let divisor = if has_profit {
        next_size.checked_sub(delta).ok_or(ErrorCode::MathUnderflow)?
    } else {
        next_size.checked_add(delta).ok_or(ErrorCode::MathOverflow)?
    };
    mul_div(next_price, next_size, divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;

    const E30: u128 = PRICE_PRECISION;

    #[test]
    fn long_delta_follows_price() {
        // long 10_000 USD from 2000; price falls to 1800
        let (has_profit, delta) = get_delta(
            10_000 * E30,
            2_000 * E30,
            1_800 * E30,
            true,
            0,
            0,
            0,
            100,
        )
        .unwrap();
        assert!(!has_profit);
        assert_eq!(delta, 1_000 * E30);

        let (has_profit, delta) = get_delta(
            10_000 * E30,
            2_000 * E30,
            2_200 * E30,
            true,
            0,
            0,
            0,
            100,
        )
        .unwrap();
        assert!(has_profit);
        assert_eq!(delta, 1_000 * E30);
    }

    #[test]
    fn short_delta_is_mirrored() {
        let (has_profit, delta) = get_delta(
            10_000 * E30,
            2_000 * E30,
            1_800 * E30,
            false,
            0,
            0,
            0,
            100,
        )
        .unwrap();
        assert!(has_profit);
        assert_eq!(delta, 1_000 * E30);
    }

    #[test]
    fn small_profit_floored_inside_min_profit_window() {
        // 10 bps threshold; profit of 5 bps within the window
        let size = 10_000 * E30;
        let (has_profit, delta) = get_delta(
            size,
            10_000 * E30,
            10_005 * E30,
            true,
            1_000, // last increase
            10,    // min profit bps
            3_600, // window
            2_000, // now, inside window
        )
        .unwrap();
        assert!(has_profit);
        assert_eq!(delta, 0);

        // outside the window the same profit is honored
        let (_, delta) = get_delta(
            size,
            10_000 * E30,
            10_005 * E30,
            true,
            1_000,
            10,
            3_600,
            10_000,
        )
        .unwrap();
        assert_eq!(delta, 5 * E30);
    }

    #[test]
    fn next_average_price_preserves_pnl_for_longs() {
        // 1000 at 2000, doubled at 2200: 10% unrealized profit
        let next = get_next_average_price(
            1_000 * E30,
            2_000 * E30,
            2_200 * E30,
            true,
            1_000 * E30,
            0,
            0,
            0,
            100,
        )
        .unwrap();
        // divisor = 2000 + 100, price * 2000 / 2100
        assert_eq!(next, 2_200 * E30 * 2_000 / 2_100);
    }

    #[test]
    fn next_average_price_flips_sign_for_shorts() {
        // short 1000 at 2000, doubled at 1800: profit shrinks the divisor
        let next = get_next_average_price(
            1_000 * E30,
            2_000 * E30,
            1_800 * E30,
            false,
            1_000 * E30,
            0,
            0,
            0,
            100,
        )
        .unwrap();
        // delta = 100, divisor = 2000 - 100
        assert_eq!(next, 1_800 * E30 * 2_000 / 1_900);
    }

    #[test]
    fn global_short_average_price_tracks_book() {
        let next = get_next_global_short_average_price(
            1_000 * E30,
            2_000 * E30,
            1_800 * E30,
            1_000 * E30,
        )
        .unwrap();
        assert_eq!(next, 1_800 * E30 * 2_000 / 1_900);
    }
}
