//! Accounting-flow tests composing the ledger primitives and position math
//! the way the instruction handlers do.

#[cfg(test)]
mod flow_tests {
    use anchor_lang::prelude::Pubkey;

    use crate::constants::*;
    use crate::instructions::perp::decrease_position::{decrease_position_core, DecreaseArgs};
    use crate::math::fees::get_buy_rusd_fee_basis_points;
    use crate::math::fixed_point::{
        adjust_for_decimals, mul_div, token_to_usd_min, usd_to_token_max, usd_to_token_min,
    };
    use crate::math::oracle::OraclePrice;
    use crate::state::{Position, TokenConfig, Vault};

    const E30: u128 = PRICE_PRECISION;

    fn vault() -> Vault {
        Vault {
            tax_basis_points: DEFAULT_TAX_BASIS_POINTS,
            stable_tax_basis_points: DEFAULT_STABLE_TAX_BASIS_POINTS,
            mint_burn_fee_basis_points: DEFAULT_MINT_BURN_FEE_BASIS_POINTS,
            swap_fee_basis_points: DEFAULT_SWAP_FEE_BASIS_POINTS,
            stable_swap_fee_basis_points: DEFAULT_STABLE_SWAP_FEE_BASIS_POINTS,
            margin_fee_basis_points: DEFAULT_MARGIN_FEE_BASIS_POINTS,
            liquidation_fee_usd: 100 * E30,
            funding_interval: DEFAULT_FUNDING_INTERVAL,
            max_leverage: DEFAULT_MAX_LEVERAGE,
            ..Default::default()
        }
    }

    fn usdc() -> TokenConfig {
        TokenConfig {
            whitelisted: true,
            decimals: 6,
            is_stable: true,
            ..Default::default()
        }
    }

    fn eth() -> TokenConfig {
        TokenConfig {
            whitelisted: true,
            decimals: 9,
            is_shortable: true,
            ..Default::default()
        }
    }

    fn flat_price(price: u128) -> OraclePrice {
        OraclePrice {
            price,
            confidence: 0,
            ema_price: price,
            ema_confidence: 0,
            publish_time: 0,
        }
    }

    /// 100 USDC in at a flat 1.00 price and 30 bps mint fee.
    #[test]
    fn buy_rusd_against_a_stable() {
        let vault = vault();
        let mut config = usdc();
        let min_price = E30;
        let amount_in: u64 = 100_000_000;

        let rusd_value = adjust_for_decimals(
            mul_div(amount_in as u128, min_price, PRICE_PRECISION).unwrap(),
            config.decimals,
            RUSD_DECIMALS,
        )
        .unwrap();
        let fee_bps = get_buy_rusd_fee_basis_points(&vault, &config, 0, rusd_value).unwrap();
        assert_eq!(fee_bps, 30);

        let after_fee = config.collect_swap_fees(amount_in, fee_bps, min_price).unwrap();
        let mint_amount = adjust_for_decimals(
            mul_div(after_fee as u128, min_price, PRICE_PRECISION).unwrap(),
            config.decimals,
            RUSD_DECIMALS,
        )
        .unwrap();
        config.increase_rusd_amount(mint_amount).unwrap();
        config.increase_pool_amount(after_fee, amount_in).unwrap();

        assert_eq!(mint_amount, 99_700_000_000); // 99.7 RUSD
        assert_eq!(config.fee_reserves, 300_000);
        assert_eq!(config.pool_amount, 99_700_000);
        assert_eq!(config.rusd_amount, 99_700_000_000);
    }

    /// Minting and then redeeming at a flat price returns less than went in,
    /// and the difference is exactly the two fees.
    #[test]
    fn buy_sell_round_trip_never_gains() {
        let vault = vault();
        let mut config = usdc();
        let price = E30;
        let amount_in: u64 = 100_000_000;

        let after_fee = config.collect_swap_fees(amount_in, 30, price).unwrap();
        let minted = adjust_for_decimals(
            mul_div(after_fee as u128, price, PRICE_PRECISION).unwrap(),
            6,
            RUSD_DECIMALS,
        )
        .unwrap();
        config.increase_rusd_amount(minted).unwrap();
        config.increase_pool_amount(after_fee, amount_in).unwrap();

        // redeem everything that was minted
        let redemption = config.get_redemption_amount(minted, price).unwrap();
        config.decrease_rusd_amount(minted).unwrap();
        config.decrease_pool_amount(redemption).unwrap();
        let out = config
            .collect_swap_fees(redemption, vault.mint_burn_fee_basis_points, price)
            .unwrap();

        assert!(out <= amount_in);
        let total_fees = config.fee_reserves;
        assert_eq!(out + total_fees, amount_in);
        assert_eq!(config.rusd_amount, 0);
        assert_eq!(config.pool_amount, 0);
    }

    /// 1 ETH in at 2000 against USDC at 1.00 with a 30 bps swap fee.
    #[test]
    fn swap_eth_for_usdc() {
        let mut eth_config = eth();
        let mut usdc_config = usdc();
        usdc_config.pool_amount = 3_000_000_000; // 3000 USDC of depth
        usdc_config.token_balance = 3_000_000_000;

        let amount_in: u64 = 1_000_000_000;
        let price_in = 2_000 * E30; // ETH min price
        let price_out = E30; // USDC max price

        let amount_out = adjust_for_decimals(
            mul_div(amount_in as u128, price_in, price_out).unwrap(),
            eth_config.decimals,
            usdc_config.decimals,
        )
        .unwrap() as u64;
        assert_eq!(amount_out, 2_000_000_000);

        let rusd_delta = adjust_for_decimals(
            mul_div(amount_in as u128, price_in, PRICE_PRECISION).unwrap(),
            eth_config.decimals,
            RUSD_DECIMALS,
        )
        .unwrap();

        let amount_out_after_fees = usdc_config
            .collect_swap_fees(amount_out, 30, price_out)
            .unwrap();
        eth_config.increase_rusd_amount(rusd_delta).unwrap();
        usdc_config.decrease_rusd_amount(rusd_delta).unwrap();
        eth_config.increase_pool_amount(amount_in, amount_in).unwrap();
        usdc_config.decrease_pool_amount(amount_out).unwrap();

        assert_eq!(amount_out_after_fees, 1_994_000_000);
        assert_eq!(usdc_config.fee_reserves, 6_000_000);
        assert_eq!(eth_config.pool_amount, 1_000_000_000);
        assert_eq!(usdc_config.pool_amount, 1_000_000_000);
    }

    /// Swapping there and back at unchanged prices returns no more than the
    /// original amount; the shortfall is the two fees.
    #[test]
    fn swap_round_trip_never_gains() {
        let mut eth_config = eth();
        let mut usdc_config = usdc();
        usdc_config.pool_amount = 3_000_000_000;
        usdc_config.token_balance = 3_000_000_000;

        let eth_price = 2_000 * E30;
        let usdc_price = E30;
        let amount_in: u64 = 1_000_000_000;

        let usdc_out = adjust_for_decimals(
            mul_div(amount_in as u128, eth_price, usdc_price).unwrap(),
            9,
            6,
        )
        .unwrap() as u64;
        let usdc_after_fee = usdc_config.collect_swap_fees(usdc_out, 30, usdc_price).unwrap();
        eth_config.increase_pool_amount(amount_in, amount_in).unwrap();
        usdc_config.decrease_pool_amount(usdc_out).unwrap();

        let eth_out = adjust_for_decimals(
            mul_div(usdc_after_fee as u128, usdc_price, eth_price).unwrap(),
            6,
            9,
        )
        .unwrap() as u64;
        let eth_after_fee = eth_config.collect_swap_fees(eth_out, 30, eth_price).unwrap();

        assert!(eth_after_fee < amount_in);
        // shortfall is the USDC fee revalued in ETH plus the ETH fee
        let usdc_fee_in_eth = adjust_for_decimals(
            mul_div(usdc_config.fee_reserves as u128, usdc_price, eth_price).unwrap(),
            6,
            9,
        )
        .unwrap() as u64;
        assert_eq!(
            amount_in - eth_after_fee,
            usdc_fee_in_eth + eth_config.fee_reserves
        );
    }

    /// Opening a 10_000 USD long on ETH with 1 ETH collateral at 2000/1999.
    #[test]
    fn open_long_accounting() {
        let vault = vault();
        let mut config = eth();
        let size_delta = 10_000 * E30;
        let max_price = 2_000 * E30;
        let min_price = 1_999 * E30;
        let collateral_amount: u64 = 1_000_000_000;

        let mut position = Position {
            is_long: true,
            ..Default::default()
        };
        position.average_price = max_price; // first increase marks at max

        let fee = config
            .collect_margin_fees(
                size_delta,
                position.size,
                position.entry_funding_rate,
                vault.margin_fee_basis_points,
                max_price,
            )
            .unwrap();
        assert_eq!(fee, 10 * E30);

        let collateral_usd =
            token_to_usd_min(collateral_amount, min_price, config.decimals).unwrap();
        assert_eq!(collateral_usd, 1_999 * E30);

        position.collateral = collateral_usd - fee;
        position.size = size_delta;
        assert!(position.size >= position.collateral);
        assert_eq!(position.collateral, 1_989 * E30);

        let reserve_delta = usd_to_token_max(size_delta, min_price, config.decimals).unwrap();
        assert_eq!(reserve_delta, 5_002_501_250); // ~5.0025 ETH

        // pre-seeded pool depth plus the deposited collateral
        config
            .increase_pool_amount(9_000_000_000, 9_000_000_000)
            .unwrap();
        config
            .increase_pool_amount(collateral_amount, 10_000_000_000)
            .unwrap();
        config.increase_reserved_amount(reserve_delta).unwrap();

        // guaranteed USD identity: Δguaranteed = size_delta - (collateral_usd - fee)
        config.increase_guaranteed_usd(size_delta + fee).unwrap();
        config.decrease_guaranteed_usd(collateral_usd).unwrap();
        assert_eq!(
            config.guaranteed_usd,
            size_delta - (collateral_usd - fee)
        );
        assert_eq!(config.guaranteed_usd, 8_011 * E30);
    }

    /// Over-leverage at open must fail the raise-mode liquidation check.
    #[test]
    fn over_leverage_at_open_reverts() {
        use crate::math::liquidation::validate_liquidation;
        let vault = vault();
        let position = Position {
            size: 10_000 * E30,
            collateral: 150 * E30, // 66x against a 50x cap
            average_price: 2_000 * E30,
            is_long: true,
            ..Default::default()
        };
        assert!(validate_liquidation(
            &position,
            &vault,
            2_000 * E30,
            0,
            0,
            100,
            true
        )
        .is_err());
    }

    /// Partially closing a losing USDC-collateralized BTC short releases
    /// reserves proportionally and credits the pool with the realised loss.
    #[test]
    fn partial_short_decrease_credits_pool() {
        let vault = vault();
        let mut usdc_config = usdc();
        let mut btc_config = eth(); // non-stable, shortable
        btc_config.global_short_size = 10_000 * E30;
        btc_config.global_short_average_price = 20_000 * E30;

        usdc_config.pool_amount = 50_000_000_000; // 50k USDC
        usdc_config.token_balance = 60_000_000_000;
        usdc_config.reserved_amount = 10_000_000_000;

        let mut position = Position {
            owner: Pubkey::new_unique(),
            is_long: false,
            size: 10_000 * E30,
            collateral: 2_000 * E30,
            average_price: 20_000 * E30,
            reserve_amount: 10_000_000_000,
            ..Default::default()
        };

        let args = DecreaseArgs {
            collateral_delta_usd: 0,
            size_delta: 5_000 * E30,
        };
        // BTC moved against the short: 20000 -> 21000
        let index_price = flat_price(21_000 * E30);
        let collateral_price = flat_price(E30);

        let amount_out = decrease_position_core(
            &vault,
            &mut usdc_config,
            Some(&mut btc_config),
            &mut position,
            Pubkey::new_unique(),
            &args,
            &index_price,
            &collateral_price,
            60_000_000_000,
            false,
            100,
        )
        .unwrap();

        // reserve released proportionally
        assert_eq!(usdc_config.reserved_amount, 5_000_000_000);
        assert_eq!(position.reserve_amount, 5_000_000_000);
        // realised loss: delta = 10000 * 1000/20000 = 500, adjusted = 250
        assert_eq!(position.realised_pnl, -(250 * E30 as i128));
        // the loss flows into the pool at the collateral's max price
        assert_eq!(usdc_config.pool_amount, 50_000_000_000 + 250_000_000);
        // fee (5 USD) came out of collateral since nothing was withdrawn
        assert_eq!(position.collateral, (2_000 - 250 - 5) * E30);
        assert_eq!(position.size, 5_000 * E30);
        assert_eq!(btc_config.global_short_size, 5_000 * E30);
        assert_eq!(amount_out, 0);
        // margin fee retained in the collateral asset
        assert_eq!(usdc_config.fee_reserves, 5_000_000);
    }

    /// Fully closing a winning long pays profit plus collateral out of the
    /// pool, net of fees.
    #[test]
    fn full_long_close_pays_from_pool() {
        let vault = vault();
        let mut eth_config = eth();
        eth_config.pool_amount = 10_000_000_000;
        eth_config.token_balance = 10_000_000_000;
        eth_config.reserved_amount = 5_000_000_000;
        eth_config.guaranteed_usd = 8_011 * E30;

        let mut position = Position {
            owner: Pubkey::new_unique(),
            is_long: true,
            size: 10_000 * E30,
            collateral: 1_989 * E30,
            average_price: 2_000 * E30,
            reserve_amount: 5_000_000_000,
            ..Default::default()
        };

        let args = DecreaseArgs {
            collateral_delta_usd: 0,
            size_delta: 10_000 * E30,
        };
        // price moved up 10%
        let price = flat_price(2_200 * E30);

        let amount_out = decrease_position_core(
            &vault,
            &mut eth_config,
            None,
            &mut position,
            Pubkey::new_unique(),
            &args,
            &price,
            &price,
            10_000_000_000,
            false,
            100,
        )
        .unwrap();

        // profit = 10000 * 200/2000 = 1000; usd_out = 1000 + 1989 collateral
        // fee = 10; paid out at 2200
        let expected_usd_out_after_fee = (1_000 + 1_989 - 10) * E30;
        assert_eq!(
            amount_out,
            usd_to_token_min(expected_usd_out_after_fee, 2_200 * E30, 9).unwrap()
        );
        assert_eq!(position.size, 0);
        assert_eq!(position.collateral, 0);
        assert_eq!(eth_config.reserved_amount, 0);
        // guaranteed fully unwound: +1989 - 10000 + 8011 = 0
        assert_eq!(eth_config.guaranteed_usd, 0);
    }
}
