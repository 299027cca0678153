use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::constants::BASIS_POINTS_DIVISOR;
use crate::error::ErrorCode;
use crate::math::fees::{get_funding_fee, get_position_fee};
use crate::math::position::get_delta;
use crate::state::{Position, Vault};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquidationState {
    /// Position is healthy
    Healthy,
    /// Losses or fees exhaust the collateral; the position is seized
    Liquidatable,
    /// Over max leverage but still solvent; the position is force-closed
    MaxLeverageExceeded,
}

/// Assess a position against the liquidation decision table. `mark_price` is
/// the closing-side index price (min for longs, max for shorts). With `raise`
/// the breaching conditions revert instead of reporting, which is how the
/// open/decrease paths enforce the leverage bound.
///
/// Returns the state together with the margin fees owed (position fee on the
/// whole size plus accrued funding), capped at the remaining collateral when
/// the fees themselves are what exhausts it.
pub fn validate_liquidation(
    position: &Position,
    vault: &Vault,
    mark_price: u128,
    cumulative_funding_rate: u128,
    min_profit_basis_points: u64,
    now: i64,
    raise: bool,
) -> Result<(LiquidationState, u128)> {
    let (has_profit, delta) = get_delta(
        position.size,
        position.average_price,
        mark_price,
        position.is_long,
        position.last_increased_time,
        min_profit_basis_points,
        vault.min_profit_time,
        now,
    )?;

    let mut margin_fees = get_funding_fee(
        position.size,
        cumulative_funding_rate,
        position.entry_funding_rate,
    )?;
    margin_fees = margin_fees
        .checked_add(get_position_fee(
            position.size,
            vault.margin_fee_basis_points,
        )?)
        .ok_or(ErrorCode::MathOverflow)?;

    if !has_profit && position.collateral < delta {
        if raise {
            return err!(ErrorCode::LossesExceedCollateral);
        }
        return Ok((LiquidationState::Liquidatable, margin_fees));
    }

    let mut remaining_collateral = position.collateral;
    if !has_profit {
        remaining_collateral = position.collateral - delta;
    }

    if remaining_collateral < margin_fees {
        if raise {
            return err!(ErrorCode::FeesExceedCollateral);
        }
        // cap the seized fees at what is left
        return Ok((LiquidationState::Liquidatable, remaining_collateral));
    }

    if remaining_collateral
        < margin_fees
            .checked_add(vault.liquidation_fee_usd)
            .ok_or(ErrorCode::MathOverflow)?
    {
        if raise {
            return err!(ErrorCode::LiquidationFeesExceedCollateral);
        }
        return Ok((LiquidationState::Liquidatable, margin_fees));
    }

    if U256::from(remaining_collateral) * U256::from(vault.max_leverage)
        < U256::from(position.size) * U256::from(BASIS_POINTS_DIVISOR)
    {
        if raise {
            return err!(ErrorCode::MaxLeverageExceeded);
        }
        return Ok((LiquidationState::MaxLeverageExceeded, margin_fees));
    }

    Ok((LiquidationState::Healthy, margin_fees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MAX_LEVERAGE, PRICE_PRECISION};

    const E30: u128 = PRICE_PRECISION;

    fn vault() -> Vault {
        Vault {
            margin_fee_basis_points: 10,
            liquidation_fee_usd: 100 * E30,
            max_leverage: DEFAULT_MAX_LEVERAGE,
            ..Default::default()
        }
    }

    fn long(size: u128, collateral: u128, average_price: u128) -> Position {
        Position {
            size,
            collateral,
            average_price,
            is_long: true,
            ..Default::default()
        }
    }

    #[test]
    fn healthy_position_reports_zero_state() {
        let position = long(10_000 * E30, 1_989 * E30, 2_000 * E30);
        let (state, fees) =
            validate_liquidation(&position, &vault(), 1_990 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::Healthy);
        assert_eq!(fees, 10 * E30);
    }

    #[test]
    fn losses_exceeding_collateral_liquidate() {
        // 10x long from 2000, price collapses to 1500: delta 2500 > collateral
        let position = long(10_000 * E30, 1_000 * E30, 2_000 * E30);
        let (state, fees) =
            validate_liquidation(&position, &vault(), 1_500 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::Liquidatable);
        assert_eq!(fees, 10 * E30);
        assert!(
            validate_liquidation(&position, &vault(), 1_500 * E30, 0, 0, 100, true).is_err()
        );
    }

    #[test]
    fn fees_exceeding_remaining_collateral_cap_the_seizure() {
        // remaining = 1989 - 1985 = 4 < 10 margin fee
        let position = long(10_000 * E30, 1_989 * E30, 2_000 * E30);
        let (state, fees) =
            validate_liquidation(&position, &vault(), 1_603 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::Liquidatable);
        assert_eq!(fees, position.collateral - 1_985 * E30);
    }

    #[test]
    fn liquidation_fee_breach_keeps_full_margin_fees() {
        let position = long(10_000 * E30, 1_989 * E30, 2_000 * E30);
        // delta = 950, remaining = 1039 covers fees + liquidation fee
        let (state, fees) =
            validate_liquidation(&position, &vault(), 1_810 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::Healthy);
        assert_eq!(fees, 10 * E30);

        // delta = 1950, remaining = 39: covers margin fees but not the
        // additional 100 USD liquidation fee
        let (state, fees) =
            validate_liquidation(&position, &vault(), 1_610 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::Liquidatable);
        assert_eq!(fees, 10 * E30);
    }

    #[test]
    fn over_leverage_but_solvent_returns_state_two() {
        // collateral 150 vs size 10000: 66x > 50x, but well collateralized
        // against a small move
        let position = long(10_000 * E30, 150 * E30, 2_000 * E30);
        let (state, _) =
            validate_liquidation(&position, &vault(), 1_999 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(state, LiquidationState::MaxLeverageExceeded);
        assert!(
            validate_liquidation(&position, &vault(), 1_999 * E30, 0, 0, 100, true).is_err()
        );
    }

    #[test]
    fn liquidation_assessment_is_idempotent() {
        let position = long(10_000 * E30, 1_000 * E30, 2_000 * E30);
        let first =
            validate_liquidation(&position, &vault(), 1_500 * E30, 0, 0, 100, false).unwrap();
        let second =
            validate_liquidation(&position, &vault(), 1_500 * E30, 0, 0, 100, false).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn funding_adds_to_margin_fees() {
        let mut position = long(10_000 * E30, 1_989 * E30, 2_000 * E30);
        position.entry_funding_rate = 1_000;
        // rate advanced 100 at 1e6 precision: 0.01% of 10000 = 1 USD
        let (_, fees) =
            validate_liquidation(&position, &vault(), 1_990 * E30, 1_100, 0, 100, false)
                .unwrap();
        assert_eq!(fees, 11 * E30);
    }
}
