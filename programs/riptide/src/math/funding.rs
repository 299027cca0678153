use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::events::UpdateFundingRate;
use crate::state::{TokenConfig, Vault};

/// Funding owed per interval is proportional to utilisation:
/// `factor * reserved * intervals / pool`, at FUNDING_RATE_PRECISION.
pub fn get_next_funding_rate(config: &TokenConfig, vault: &Vault, now: i64) -> Result<u128> {
    if config
        .last_funding_time
        .checked_add(vault.funding_interval)
        .ok_or(ErrorCode::MathOverflow)?
        > now
    {
        return Ok(0);
    }
    let intervals = (now - config.last_funding_time) / vault.funding_interval;
    if config.pool_amount == 0 {
        return Ok(0);
    }
    let factor = if config.is_stable {
        vault.stable_funding_rate_factor
    } else {
        vault.funding_rate_factor
    };
    (factor as u128)
        .checked_mul(config.reserved_amount as u128)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_mul(intervals as u128)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(config.pool_amount as u128)
        .ok_or(error!(ErrorCode::DivisionByZero))
}

/// Accrue funding for the asset, quantized to funding-interval boundaries.
/// The grid aligns to real time: `last_funding_time` snaps to
/// `floor(now / interval) * interval` rather than stepping by whole
/// intervals from the previous observation.
pub fn update_cumulative_funding_rate(
    config: &mut TokenConfig,
    vault: &Vault,
    now: i64,
) -> Result<()> {
    if config.last_funding_time == 0 {
        config.last_funding_time = now / vault.funding_interval * vault.funding_interval;
        return Ok(());
    }
    if config.last_funding_time + vault.funding_interval > now {
        return Ok(());
    }

    let funding_rate = get_next_funding_rate(config, vault, now)?;
    config.cumulative_funding_rate = config
        .cumulative_funding_rate
        .checked_add(funding_rate)
        .ok_or(ErrorCode::MathOverflow)?;
    config.last_funding_time = now / vault.funding_interval * vault.funding_interval;

    emit!(UpdateFundingRate {
        token: config.mint,
        cumulative_funding_rate: config.cumulative_funding_rate,
        timestamp: now,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault {
            funding_interval: 3_600,
            funding_rate_factor: 600,
            stable_funding_rate_factor: 600,
            ..Default::default()
        }
    }

    fn config(pool: u64, reserved: u64) -> TokenConfig {
        TokenConfig {
            pool_amount: pool,
            reserved_amount: reserved,
            ..Default::default()
        }
    }

    #[test]
    fn first_update_only_records_the_grid_slot() {
        let vault = vault();
        let mut cfg = config(1_000, 500);
        update_cumulative_funding_rate(&mut cfg, &vault, 10_000).unwrap();
        assert_eq!(cfg.cumulative_funding_rate, 0);
        assert_eq!(cfg.last_funding_time, 7_200);
    }

    #[test]
    fn no_accrual_inside_an_interval() {
        let vault = vault();
        let mut cfg = config(1_000, 500);
        cfg.last_funding_time = 7_200;
        update_cumulative_funding_rate(&mut cfg, &vault, 10_000).unwrap();
        assert_eq!(cfg.cumulative_funding_rate, 0);
        assert_eq!(cfg.last_funding_time, 7_200);
    }

    #[test]
    fn accrues_per_elapsed_interval_and_utilisation() {
        let vault = vault();
        let mut cfg = config(1_000, 500);
        cfg.last_funding_time = 7_200;
        // two whole intervals later, half utilised: 600 * 500 * 2 / 1000
        update_cumulative_funding_rate(&mut cfg, &vault, 7_200 + 2 * 3_600 + 30).unwrap();
        assert_eq!(cfg.cumulative_funding_rate, 600);
        // grid snapped to the wall clock, not stepped from the old slot
        assert_eq!(cfg.last_funding_time, 14_400);
    }

    #[test]
    fn rate_is_zero_with_empty_pool_or_no_reserve() {
        let vault = vault();
        let mut cfg = config(0, 0);
        cfg.last_funding_time = 3_600;
        update_cumulative_funding_rate(&mut cfg, &vault, 10 * 3_600).unwrap();
        assert_eq!(cfg.cumulative_funding_rate, 0);

        let cfg = TokenConfig {
            pool_amount: 1_000,
            reserved_amount: 0,
            last_funding_time: 3_600,
            ..Default::default()
        };
        assert_eq!(get_next_funding_rate(&cfg, &vault, 10 * 3_600).unwrap(), 0);
    }

    #[test]
    fn cumulative_rate_is_monotonic() {
        let vault = vault();
        let mut cfg = config(1_000, 500);
        let mut last = 0u128;
        let mut now = 3_600;
        for _ in 0..5 {
            update_cumulative_funding_rate(&mut cfg, &vault, now).unwrap();
            assert!(cfg.cumulative_funding_rate >= last);
            last = cfg.cumulative_funding_rate;
            now += 5_400;
        }
    }
}
