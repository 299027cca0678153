use anchor_lang::prelude::*;

use crate::constants::{BASIS_POINTS_DIVISOR, FUNDING_RATE_PRECISION};
use crate::error::ErrorCode;
use crate::math::fixed_point::mul_div;
use crate::state::{TokenConfig, Vault};

/// The RUSD debt an asset should carry for the pool to sit at its target
/// weight: `supply * weight / total_weights`.
pub fn get_target_rusd_amount(
    rusd_supply: u128,
    weight: u64,
    total_token_weights: u64,
) -> Result<u128> {
    if total_token_weights == 0 {
        return Ok(0);
    }
    mul_div(rusd_supply, weight as u128, total_token_weights as u128)
}

/// Dynamic fee: moves that bring the asset's debt closer to its target weight
/// earn a rebate against the base fee, moves away pay an additional tax.
pub fn get_fee_basis_points(
    has_dynamic_fees: bool,
    fee_basis_points: u64,
    tax_basis_points: u64,
    initial_amount: u128,
    rusd_delta: u128,
    increment: bool,
    target_amount: u128,
) -> Result<u64> {
    if !has_dynamic_fees {
        return Ok(fee_basis_points);
    }

    let next_amount = if increment {
        initial_amount
            .checked_add(rusd_delta)
            .ok_or(ErrorCode::MathOverflow)?
    } else {
        initial_amount.saturating_sub(rusd_delta)
    };

    if target_amount == 0 {
        return Ok(fee_basis_points);
    }

    let initial_diff = initial_amount.abs_diff(target_amount);
    let next_diff = next_amount.abs_diff(target_amount);

    if next_diff < initial_diff {
        let rebate_bps = mul_div(tax_basis_points as u128, initial_diff, target_amount)?;
        return Ok(if rebate_bps > fee_basis_points as u128 {
            0
        } else {
            fee_basis_points - rebate_bps as u64
        });
    }

    let mut average_diff = initial_diff
        .checked_add(next_diff)
        .ok_or(ErrorCode::MathOverflow)?
        / 2;
    if average_diff > target_amount {
        average_diff = target_amount;
    }
    let tax_bps = mul_div(tax_basis_points as u128, average_diff, target_amount)?;
    fee_basis_points
        .checked_add(tax_bps as u64)
        .ok_or(ErrorCode::MathOverflow.into())
}

pub fn get_buy_rusd_fee_basis_points(
    vault: &Vault,
    config: &TokenConfig,
    rusd_supply: u128,
    rusd_delta: u128,
) -> Result<u64> {
    get_fee_basis_points(
        vault.has_dynamic_fees,
        vault.mint_burn_fee_basis_points,
        vault.tax_basis_points,
        config.rusd_amount,
        rusd_delta,
        true,
        get_target_rusd_amount(rusd_supply, config.weight, vault.total_token_weights)?,
    )
}

pub fn get_sell_rusd_fee_basis_points(
    vault: &Vault,
    config: &TokenConfig,
    rusd_supply: u128,
    rusd_delta: u128,
) -> Result<u64> {
    get_fee_basis_points(
        vault.has_dynamic_fees,
        vault.mint_burn_fee_basis_points,
        vault.tax_basis_points,
        config.rusd_amount,
        rusd_delta,
        false,
        get_target_rusd_amount(rusd_supply, config.weight, vault.total_token_weights)?,
    )
}

/// The higher of the two sides' fees; stable-to-stable swaps use the stable
/// base and tax rates.
pub fn get_swap_fee_basis_points(
    vault: &Vault,
    config_in: &TokenConfig,
    config_out: &TokenConfig,
    rusd_supply: u128,
    rusd_delta: u128,
) -> Result<u64> {
    let is_stable_swap = config_in.is_stable && config_out.is_stable;
    let (base_bps, tax_bps) = if is_stable_swap {
        (
            vault.stable_swap_fee_basis_points,
            vault.stable_tax_basis_points,
        )
    } else {
        (vault.swap_fee_basis_points, vault.tax_basis_points)
    };
    let fee_0 = get_fee_basis_points(
        vault.has_dynamic_fees,
        base_bps,
        tax_bps,
        config_in.rusd_amount,
        rusd_delta,
        true,
        get_target_rusd_amount(rusd_supply, config_in.weight, vault.total_token_weights)?,
    )?;
    let fee_1 = get_fee_basis_points(
        vault.has_dynamic_fees,
        base_bps,
        tax_bps,
        config_out.rusd_amount,
        rusd_delta,
        false,
        get_target_rusd_amount(rusd_supply, config_out.weight, vault.total_token_weights)?,
    )?;
    Ok(fee_0.max(fee_1))
}

/// Fee on a position size change, USD.
pub fn get_position_fee(size_delta: u128, margin_fee_basis_points: u64) -> Result<u128> {
    if size_delta == 0 {
        return Ok(0);
    }
    let after_fee = mul_div(
        size_delta,
        (BASIS_POINTS_DIVISOR - margin_fee_basis_points) as u128,
        BASIS_POINTS_DIVISOR as u128,
    )?;
    Ok(size_delta - after_fee)
}

/// Funding accrued on `size` since the position's entry snapshot, USD.
pub fn get_funding_fee(
    size: u128,
    cumulative_funding_rate: u128,
    entry_funding_rate: u128,
) -> Result<u128> {
    if size == 0 {
        return Ok(0);
    }
    let funding_rate = cumulative_funding_rate
        .checked_sub(entry_funding_rate)
        .ok_or(ErrorCode::MathUnderflow)?;
    if funding_rate == 0 {
        return Ok(0);
    }
    mul_div(size, funding_rate, FUNDING_RATE_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;

    #[test]
    fn static_fee_when_dynamic_disabled() {
        assert_eq!(
            get_fee_basis_points(false, 30, 50, 0, 1_000, true, 0).unwrap(),
            30
        );
    }

    #[test]
    fn rebate_when_moving_toward_target() {
        // initial 1000 below a 2000 target; buying brings debt closer
        let bps = get_fee_basis_points(true, 30, 50, 1_000, 500, true, 2_000).unwrap();
        // rebate = 50 * 1000 / 2000 = 25
        assert_eq!(bps, 5);
        // a large enough deviation floors the fee at zero
        let bps = get_fee_basis_points(true, 30, 50, 0, 500, true, 2_000).unwrap();
        assert_eq!(bps, 0);
    }

    #[test]
    fn tax_when_moving_away_from_target() {
        // initial at target; buying pushes debt above it
        let bps = get_fee_basis_points(true, 30, 50, 2_000, 1_000, true, 2_000).unwrap();
        // average diff = (0 + 1000)/2 = 500; tax = 50 * 500 / 2000 = 12
        assert_eq!(bps, 42);
        // average diff is capped at the target
        let bps = get_fee_basis_points(true, 30, 50, 2_000, 100_000, true, 2_000).unwrap();
        assert_eq!(bps, 80);
    }

    #[test]
    fn sell_decrement_clamps_at_zero() {
        let bps = get_fee_basis_points(true, 30, 50, 100, 500, false, 2_000).unwrap();
        // next clamps to 0: diff grows from 1900 to 2000, taxed
        assert!(bps > 30);
    }

    #[test]
    fn position_fee_via_complement() {
        // 10_000 USD at 10 bps -> 10 USD
        let fee = get_position_fee(10_000 * PRICE_PRECISION, 10).unwrap();
        assert_eq!(fee, 10 * PRICE_PRECISION);
        assert_eq!(get_position_fee(0, 10).unwrap(), 0);
    }

    #[test]
    fn funding_fee_zero_until_rate_advances() {
        let size = 10_000 * PRICE_PRECISION;
        assert_eq!(get_funding_fee(size, 500, 500).unwrap(), 0);
        // rate advanced by 100 at 1e6 precision -> 0.01% of size
        let fee = get_funding_fee(size, 600, 500).unwrap();
        assert_eq!(fee, PRICE_PRECISION); // 1 USD
        assert!(get_funding_fee(size, 400, 500).is_err());
    }
}
