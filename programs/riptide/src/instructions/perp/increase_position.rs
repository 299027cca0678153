use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::{IncreasePosition as IncreasePositionEvent, UpdatePosition};
use crate::instructions::validate_router;
use crate::math::fixed_point::{token_to_usd_min, usd_to_token_max, usd_to_token_min};
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::liquidation::validate_liquidation;
use crate::math::oracle::read_price;
use crate::math::position::{get_next_average_price, get_next_global_short_average_price};
use crate::state::{Permission, Position, TokenConfig, Vault};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct IncreasePositionParams {
    /// Collateral deposit in collateral-asset units; may be zero when only
    /// adding size
    pub collateral_amount: u64,
    /// Size increase, USD at PRICE_PRECISION
    pub size_delta: u128,
    pub is_long: bool,
}

#[derive(Accounts)]
#[instruction(params: IncreasePositionParams)]
pub struct IncreasePosition<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: the position owner; the authority must be the owner itself or
    /// a router the owner approved
    pub owner: UncheckedAccount<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.is_leverage_enabled @ ErrorCode::LeverageDisabled,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub collateral_mint: Box<Account<'info, Mint>>,

    pub index_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, collateral_mint.key().as_ref()],
        bump = collateral_config.bump,
        constraint = collateral_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
    )]
    pub collateral_config: Box<Account<'info, TokenConfig>>,

    /// The index asset's config; required for shorts, omitted for longs
    /// where the index is the collateral asset
    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, index_mint.key().as_ref()],
        bump = index_config.bump,
    )]
    pub index_config: Option<Box<Account<'info, TokenConfig>>>,

    #[account(
        init_if_needed,
        payer = authority,
        space = Position::LEN,
        seeds = [
            POSITION_SEED,
            owner.key().as_ref(),
            collateral_mint.key().as_ref(),
            index_mint.key().as_ref(),
            &[params.is_long as u8],
        ],
        bump,
    )]
    pub position: Box<Account<'info, Position>>,

    /// CHECK: price feed for the collateral asset
    #[account(
        constraint = collateral_oracle.key() == collateral_config.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub collateral_oracle: UncheckedAccount<'info>,

    /// CHECK: price feed for the index asset; validated in the handler
    /// against the index config (or the collateral config for longs)
    pub index_oracle: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = funding_token_account.mint == collateral_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub funding_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = vault_token_account.key() == collateral_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    /// Required when the authority is not the position owner
    pub router_approval: Option<Account<'info, Permission>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<IncreasePosition>, params: IncreasePositionParams) -> Result<()> {
    let authority_key = ctx.accounts.authority.key();
    let owner_key = ctx.accounts.owner.key();
    validate_router(
        &authority_key,
        &owner_key,
        ctx.accounts.router_approval.as_ref(),
        ctx.program_id,
    )?;

    // Longs ride the collateral asset itself; shorts post stable collateral
    // against a shortable, non-stable index.
    if params.is_long {
        require_keys_eq!(
            ctx.accounts.collateral_mint.key(),
            ctx.accounts.index_mint.key(),
            ErrorCode::LongMustMatchIndex
        );
        require!(
            !ctx.accounts.collateral_config.is_stable,
            ErrorCode::LongIndexMustNotBeStable
        );
    } else {
        require!(
            ctx.accounts.collateral_config.is_stable,
            ErrorCode::ShortCollateralMustBeStable
        );
        let index_config = ctx
            .accounts
            .index_config
            .as_ref()
            .ok_or(ErrorCode::TokenConfigMissing)?;
        require!(index_config.whitelisted, ErrorCode::TokenNotWhitelisted);
        require!(!index_config.is_stable, ErrorCode::ShortIndexMustNotBeStable);
        require!(index_config.is_shortable, ErrorCode::IndexNotShortable);
    }

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    update_cumulative_funding_rate(&mut ctx.accounts.collateral_config, &ctx.accounts.vault, now)?;

    let collateral_price = read_price(&ctx.accounts.collateral_oracle.to_account_info(), &clock)?;
    let (index_price, index_min_profit_bps) = if params.is_long {
        require_keys_eq!(
            ctx.accounts.index_oracle.key(),
            ctx.accounts.collateral_config.oracle,
            ErrorCode::OracleAccountMismatch
        );
        (
            read_price(&ctx.accounts.collateral_oracle.to_account_info(), &clock)?,
            ctx.accounts.collateral_config.min_profit_basis_points,
        )
    } else {
        let index_config = ctx
            .accounts
            .index_config
            .as_ref()
            .ok_or(ErrorCode::TokenConfigMissing)?;
        require_keys_eq!(
            ctx.accounts.index_oracle.key(),
            index_config.oracle,
            ErrorCode::OracleAccountMismatch
        );
        (
            read_price(&ctx.accounts.index_oracle.to_account_info(), &clock)?,
            index_config.min_profit_basis_points,
        )
    };

    // opening side: longs pay the index max price, shorts receive the min
    let mark_price = index_price.get(params.is_long, false)?;
    let position_key = ctx.accounts.position.key();

    let vault = &ctx.accounts.vault;
    let position = &mut ctx.accounts.position;

    if position.owner == Pubkey::default() {
        position.owner = owner_key;
        position.collateral_mint = ctx.accounts.collateral_mint.key();
        position.index_mint = ctx.accounts.index_mint.key();
        position.is_long = params.is_long;
        position.bump = ctx.bumps.position;
    }

    if position.size == 0 {
        position.average_price = mark_price;
    } else if params.size_delta > 0 {
        position.average_price = get_next_average_price(
            position.size,
            position.average_price,
            mark_price,
            params.is_long,
            params.size_delta,
            position.last_increased_time,
            index_min_profit_bps,
            vault.min_profit_time,
            now,
        )?;
    }

    let collateral_max_price = collateral_price.max_price()?;
    let collateral_min_price = collateral_price.min_price()?;

    let fee = ctx.accounts.collateral_config.collect_margin_fees(
        params.size_delta,
        ctx.accounts.position.size,
        ctx.accounts.position.entry_funding_rate,
        vault.margin_fee_basis_points,
        collateral_max_price,
    )?;

    // collateral comes in through the deposit-then-diff path
    if params.collateral_amount > 0 {
        anchor_spl::token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                anchor_spl::token::Transfer {
                    from: ctx.accounts.funding_token_account.to_account_info(),
                    to: ctx.accounts.vault_token_account.to_account_info(),
                    authority: ctx.accounts.authority.to_account_info(),
                },
            ),
            params.collateral_amount,
        )?;
        ctx.accounts.vault_token_account.reload()?;
    }
    let balance = ctx.accounts.vault_token_account.amount;
    let collateral_delta = balance
        .checked_sub(ctx.accounts.collateral_config.token_balance)
        .ok_or(ErrorCode::MathUnderflow)?;
    ctx.accounts
        .collateral_config
        .update_token_balance(balance);

    let collateral_delta_usd = token_to_usd_min(
        collateral_delta,
        collateral_min_price,
        ctx.accounts.collateral_config.decimals,
    )?;

    let position = &mut ctx.accounts.position;
    position.collateral = position
        .collateral
        .checked_add(collateral_delta_usd)
        .ok_or(ErrorCode::MathOverflow)?;
    require!(
        position.collateral >= fee,
        ErrorCode::InsufficientCollateralForFees
    );
    position.collateral -= fee;
    position.entry_funding_rate = ctx.accounts.collateral_config.cumulative_funding_rate;
    position.size = position
        .size
        .checked_add(params.size_delta)
        .ok_or(ErrorCode::MathOverflow)?;
    position.last_increased_time = now;

    require!(position.size > 0, ErrorCode::EmptyPosition);
    position.validate()?;
    // the leverage bound is enforced by the liquidation assessment with
    // raise semantics, against the closing-side price
    validate_liquidation(
        position,
        vault,
        index_price.get(!params.is_long, false)?,
        ctx.accounts.collateral_config.cumulative_funding_rate,
        index_min_profit_bps,
        now,
        true,
    )?;

    let reserve_delta = usd_to_token_max(
        params.size_delta,
        collateral_min_price,
        ctx.accounts.collateral_config.decimals,
    )?;
    position.reserve_amount = position
        .reserve_amount
        .checked_add(reserve_delta)
        .ok_or(ErrorCode::MathOverflow)?;
    ctx.accounts
        .collateral_config
        .increase_reserved_amount(reserve_delta)?;

    if params.is_long {
        // treat the position's full size as guaranteed and return the net
        // collateral: Δguaranteed = size_delta - (collateral_usd - fee)
        let config = &mut ctx.accounts.collateral_config;
        config.increase_guaranteed_usd(
            params
                .size_delta
                .checked_add(fee)
                .ok_or(ErrorCode::MathOverflow)?,
        )?;
        config.decrease_guaranteed_usd(collateral_delta_usd)?;
        config.increase_pool_amount(collateral_delta, balance)?;
        let fee_token_amount = usd_to_token_min(fee, collateral_max_price, config.decimals)?;
        config.decrease_pool_amount(fee_token_amount)?;
    } else {
        let index_config = ctx
            .accounts
            .index_config
            .as_mut()
            .ok_or(ErrorCode::TokenConfigMissing)?;
        if index_config.global_short_size == 0 {
            index_config.global_short_average_price = mark_price;
        } else {
            index_config.global_short_average_price = get_next_global_short_average_price(
                index_config.global_short_size,
                index_config.global_short_average_price,
                mark_price,
                params.size_delta,
            )?;
        }
        index_config.increase_global_short_size(params.size_delta)?;
    }

    let position = &ctx.accounts.position;
    emit!(IncreasePositionEvent {
        key: position_key,
        account: owner_key,
        collateral_token: position.collateral_mint,
        index_token: position.index_mint,
        collateral_delta: collateral_delta_usd,
        size_delta: params.size_delta,
        is_long: params.is_long,
        price: mark_price,
        fee,
    });
    emit!(UpdatePosition {
        key: position_key,
        size: position.size,
        collateral: position.collateral,
        average_price: position.average_price,
        entry_funding_rate: position.entry_funding_rate,
        reserve_amount: position.reserve_amount,
        realised_pnl: position.realised_pnl,
        mark_price,
    });

    Ok(())
}
