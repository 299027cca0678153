use anchor_lang::prelude::*;

use crate::constants::MAX_ORACLE_STALENESS;
use crate::error::ErrorCode;

/// Parsed price update, normalized to PRICE_PRECISION (1e30).
pub struct OraclePrice {
    pub price: u128,
    pub confidence: u128,
    /// Exponential moving average of the price; slow to move, so resistant to
    /// single-slot manipulation
    pub ema_price: u128,
    pub ema_confidence: u128,
    pub publish_time: i64,
}

impl OraclePrice {
    /// Oracle value with the confidence band applied. `maximise` selects the
    /// upper bound, otherwise the lower. `use_ema` prices off the EMA
    /// aggregate, used while liquidating.
    pub fn get(&self, maximise: bool, use_ema: bool) -> Result<u128> {
        let (base, conf) = if use_ema {
            (self.ema_price, self.ema_confidence)
        } else {
            (self.price, self.confidence)
        };
        let price = if maximise {
            base.checked_add(conf).ok_or(ErrorCode::MathOverflow)?
        } else {
            base.checked_sub(conf).ok_or(ErrorCode::OraclePriceInvalid)?
        };
        require!(price > 0, ErrorCode::OraclePriceInvalid);
        Ok(price)
    }

    pub fn max_price(&self) -> Result<u128> {
        self.get(true, false)
    }

    pub fn min_price(&self) -> Result<u128> {
        self.get(false, false)
    }
}

/// Parse a Pyth price-update account.
/// Layout after discriminator(8) + write_authority(32) + verification_level(1):
///   feed_id: [u8; 32] at offset 41
///   price: i64 at offset 73
///   conf: u64 at offset 81
///   exponent: i32 at offset 89
///   publish_time: i64 at offset 93
///   prev_publish_time: i64 at offset 101
///   ema_price: i64 at offset 109
///   ema_conf: u64 at offset 117
pub fn read_price(oracle_account: &AccountInfo, clock: &Clock) -> Result<OraclePrice> {
    let data = oracle_account.try_borrow_data()?;
    require!(data.len() >= 125, ErrorCode::OraclePriceInvalid);

    let price_raw = i64::from_le_bytes(
        data[73..81]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let conf_raw = u64::from_le_bytes(
        data[81..89]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let exponent = i32::from_le_bytes(
        data[89..93]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let publish_time = i64::from_le_bytes(
        data[93..101]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let ema_price_raw = i64::from_le_bytes(
        data[109..117]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let ema_conf_raw = u64::from_le_bytes(
        data[117..125]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );

    require!(price_raw > 0 && ema_price_raw > 0, ErrorCode::OraclePriceInvalid);

    let age = clock
        .unix_timestamp
        .checked_sub(publish_time)
        .ok_or(ErrorCode::MathOverflow)?;
    require!(age <= MAX_ORACLE_STALENESS, ErrorCode::OraclePriceStale);

    Ok(OraclePrice {
        price: normalize_price(price_raw as u64, exponent)?,
        confidence: normalize_price(conf_raw, exponent)?,
        ema_price: normalize_price(ema_price_raw as u64, exponent)?,
        ema_confidence: normalize_price(ema_conf_raw, exponent)?,
        publish_time,
    })
}

/// Normalize a raw price with exponent to PRICE_PRECISION (1e30).
fn normalize_price(raw_price: u64, exponent: i32) -> Result<u128> {
    // target exponent is 30; feeds typically publish at -8
    let shift = 30i32
        .checked_add(exponent)
        .ok_or(ErrorCode::OraclePriceInvalid)?;
    if shift >= 0 {
        (raw_price as u128)
            .checked_mul(
                10u128
                    .checked_pow(shift as u32)
                    .ok_or(ErrorCode::MathOverflow)?,
            )
            .ok_or(ErrorCode::MathOverflow.into())
    } else {
        let divisor = 10u128
            .checked_pow((-shift) as u32)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(raw_price as u128 / divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;

    #[test]
    fn normalizes_to_price_precision() {
        // 2000.00000000 at exponent -8
        let p = normalize_price(200_000_000_000, -8).unwrap();
        assert_eq!(p, 2_000 * PRICE_PRECISION);
    }

    #[test]
    fn confidence_band_sets_min_and_max() {
        let p = OraclePrice {
            price: 2_000 * PRICE_PRECISION,
            confidence: PRICE_PRECISION,
            ema_price: 1_990 * PRICE_PRECISION,
            ema_confidence: 2 * PRICE_PRECISION,
            publish_time: 0,
        };
        assert_eq!(p.max_price().unwrap(), 2_001 * PRICE_PRECISION);
        assert_eq!(p.min_price().unwrap(), 1_999 * PRICE_PRECISION);
        assert_eq!(p.get(true, true).unwrap(), 1_992 * PRICE_PRECISION);
        assert_eq!(p.get(false, true).unwrap(), 1_988 * PRICE_PRECISION);
    }
}
