use anchor_lang::prelude::*;
use anchor_lang::AccountsClose;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::{
    ClosePosition as ClosePositionEvent, DecreasePosition as DecreasePositionEvent, UpdatePnl,
    UpdatePosition,
};
use crate::instructions::validate_router;
use crate::math::fixed_point::{mul_div, usd_to_token_min};
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::liquidation::validate_liquidation;
use crate::math::oracle::{read_price, OraclePrice};
use crate::math::position::get_delta;
use crate::state::{Permission, Position, TokenConfig, Vault};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct DecreasePositionParams {
    pub collateral_delta_usd: u128,
    pub size_delta: u128,
    pub is_long: bool,
}

#[derive(Accounts)]
#[instruction(params: DecreasePositionParams)]
pub struct DecreasePosition<'info> {
    pub authority: Signer<'info>,

    /// CHECK: position owner; receives the account rent when the position
    /// fully closes
    #[account(mut)]
    pub owner: UncheckedAccount<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, collateral_config.mint.as_ref()],
        bump = collateral_config.bump,
        constraint = collateral_config.mint == position.collateral_mint @ ErrorCode::InvalidParameter,
    )]
    pub collateral_config: Box<Account<'info, TokenConfig>>,

    /// The index asset's config; required for shorts, omitted for longs
    /// where the index is the collateral asset
    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, index_config.mint.as_ref()],
        bump = index_config.bump,
    )]
    pub index_config: Option<Box<Account<'info, TokenConfig>>>,

    #[account(
        mut,
        seeds = [
            POSITION_SEED,
            owner.key().as_ref(),
            position.collateral_mint.as_ref(),
            position.index_mint.as_ref(),
            &[params.is_long as u8],
        ],
        bump = position.bump,
        constraint = position.owner == owner.key() @ ErrorCode::Unauthorized,
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
        constraint = vault_token_account.key() == collateral_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == collateral_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub receiver_token_account: Box<Account<'info, TokenAccount>>,

    /// Required when the authority is not the position owner
    pub router_approval: Option<Account<'info, Permission>>,

    pub token_program: Program<'info, Token>,
}

pub(crate) struct DecreaseArgs {
    pub collateral_delta_usd: u128,
    pub size_delta: u128,
}

/// The PnL/fee splitter: realises the proportional share of the position's
/// delta, charges margin fees, and works out how much USD leaves the
/// position. Returns `(usd_out, usd_out_after_fee)`.
#[allow(clippy::too_many_arguments)]
fn reduce_collateral(
    vault: &Vault,
    collateral_config: &mut TokenConfig,
    position: &mut Position,
    position_key: Pubkey,
    args: &DecreaseArgs,
    mark_price: u128,
    collateral_max_price: u128,
    collateral_balance: u64,
    index_min_profit_bps: u64,
    now: i64,
) -> Result<(u128, u128)> {
    let fee = collateral_config.collect_margin_fees(
        args.size_delta,
        position.size,
        position.entry_funding_rate,
        vault.margin_fee_basis_points,
        collateral_max_price,
    )?;

    let (has_profit, delta) = get_delta(
        position.size,
        position.average_price,
        mark_price,
        position.is_long,
        position.last_increased_time,
        index_min_profit_bps,
        vault.min_profit_time,
        now,
    )?;
    let adjusted_delta = mul_div(args.size_delta, delta, position.size)?;

    let mut usd_out: u128 = 0;
    if has_profit && adjusted_delta > 0 {
        usd_out = adjusted_delta;
        position.realised_pnl = position
            .realised_pnl
            .checked_add(i128::try_from(adjusted_delta).map_err(|_| ErrorCode::MathOverflow)?)
            .ok_or(ErrorCode::MathOverflow)?;
        // shorts pay profits out of the pool; long profits come out of the
        // guaranteed-USD accounting below
        if !position.is_long {
            let token_amount = usd_to_token_min(
                adjusted_delta,
                collateral_max_price,
                collateral_config.decimals,
            )?;
            collateral_config.decrease_pool_amount(token_amount)?;
        }
    }
    if !has_profit && adjusted_delta > 0 {
        position.collateral = position
            .collateral
            .checked_sub(adjusted_delta)
            .ok_or(ErrorCode::LossesExceedCollateral)?;
        if !position.is_long {
            let token_amount = usd_to_token_min(
                adjusted_delta,
                collateral_max_price,
                collateral_config.decimals,
            )?;
            collateral_config.increase_pool_amount(token_amount, collateral_balance)?;
        }
        position.realised_pnl = position
            .realised_pnl
            .checked_sub(i128::try_from(adjusted_delta).map_err(|_| ErrorCode::MathOverflow)?)
            .ok_or(ErrorCode::MathOverflow)?;
    }

    if args.collateral_delta_usd > 0 {
        usd_out = usd_out
            .checked_add(args.collateral_delta_usd)
            .ok_or(ErrorCode::MathOverflow)?;
        position.collateral = position
            .collateral
            .checked_sub(args.collateral_delta_usd)
            .ok_or(ErrorCode::CollateralDeltaExceedsPosition)?;
    }

    if position.size == args.size_delta {
        usd_out = usd_out
            .checked_add(position.collateral)
            .ok_or(ErrorCode::MathOverflow)?;
        position.collateral = 0;
    }

    let mut usd_out_after_fee = usd_out;
    if usd_out > fee {
        usd_out_after_fee = usd_out - fee;
    } else {
        position.collateral = position
            .collateral
            .checked_sub(fee)
            .ok_or(ErrorCode::InsufficientCollateralForFees)?;
        if position.is_long {
            let fee_tokens =
                usd_to_token_min(fee, collateral_max_price, collateral_config.decimals)?;
            collateral_config.decrease_pool_amount(fee_tokens)?;
        }
    }

    emit!(UpdatePnl {
        key: position_key,
        has_profit,
        delta: adjusted_delta,
    });

    Ok((usd_out, usd_out_after_fee))
}

/// Shared decrease flow, also driven by liquidation's force-close path.
/// Returns the token amount owed to the receiver; transfers and account
/// closure stay with the caller.
#[allow(clippy::too_many_arguments)]
pub(crate) fn decrease_position_core(
    vault: &Vault,
    collateral_config: &mut TokenConfig,
    index_config: Option<&mut TokenConfig>,
    position: &mut Position,
    position_key: Pubkey,
    args: &DecreaseArgs,
    index_price: &OraclePrice,
    collateral_price: &OraclePrice,
    collateral_balance: u64,
    use_ema: bool,
    now: i64,
) -> Result<u64> {
    require!(position.size > 0, ErrorCode::EmptyPosition);
    require!(
        position.size >= args.size_delta,
        ErrorCode::SizeDeltaExceedsPosition
    );
    require!(
        position.collateral >= args.collateral_delta_usd,
        ErrorCode::CollateralDeltaExceedsPosition
    );

    let is_long = position.is_long;
    let index_min_profit_bps = match &index_config {
        Some(config) => config.min_profit_basis_points,
        None => collateral_config.min_profit_basis_points,
    };
    // closing side: longs settle at the index min price, shorts at the max
    let mark_price = index_price.get(!is_long, use_ema)?;
    let collateral_max_price = collateral_price.get(true, use_ema)?;

    let collateral_before = position.collateral;

    let reserve_delta = u64::try_from(mul_div(
        position.reserve_amount as u128,
        args.size_delta,
        position.size,
    )?)
    .map_err(|_| ErrorCode::MathOverflow)?;
    position.reserve_amount = position
        .reserve_amount
        .checked_sub(reserve_delta)
        .ok_or(ErrorCode::InsufficientReserve)?;
    collateral_config.decrease_reserved_amount(reserve_delta)?;

    let (usd_out, usd_out_after_fee) = reduce_collateral(
        vault,
        collateral_config,
        position,
        position_key,
        args,
        mark_price,
        collateral_max_price,
        collateral_balance,
        index_min_profit_bps,
        now,
    )?;

    if position.size != args.size_delta {
        position.entry_funding_rate = collateral_config.cumulative_funding_rate;
        position.size -= args.size_delta;
        position.validate()?;
        validate_liquidation(
            position,
            vault,
            mark_price,
            collateral_config.cumulative_funding_rate,
            index_min_profit_bps,
            now,
            true,
        )?;
        if is_long {
            collateral_config.increase_guaranteed_usd(
                collateral_before
                    .checked_sub(position.collateral)
                    .ok_or(ErrorCode::MathUnderflow)?,
            )?;
            collateral_config.decrease_guaranteed_usd(args.size_delta)?;
        }
        emit!(DecreasePositionEvent {
            key: position_key,
            account: position.owner,
            collateral_token: position.collateral_mint,
            index_token: position.index_mint,
            collateral_delta: args.collateral_delta_usd,
            size_delta: args.size_delta,
            is_long,
            price: mark_price,
            fee: usd_out - usd_out_after_fee,
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
    } else {
        if is_long {
            collateral_config.increase_guaranteed_usd(collateral_before)?;
            collateral_config.decrease_guaranteed_usd(args.size_delta)?;
        }
        emit!(DecreasePositionEvent {
            key: position_key,
            account: position.owner,
            collateral_token: position.collateral_mint,
            index_token: position.index_mint,
            collateral_delta: args.collateral_delta_usd,
            size_delta: args.size_delta,
            is_long,
            price: mark_price,
            fee: usd_out - usd_out_after_fee,
        });
        emit!(ClosePositionEvent {
            key: position_key,
            size: position.size,
            collateral: position.collateral,
            average_price: position.average_price,
            entry_funding_rate: position.entry_funding_rate,
            reserve_amount: position.reserve_amount,
            realised_pnl: position.realised_pnl,
        });
        position.size = 0;
        position.collateral = 0;
        position.average_price = 0;
        position.entry_funding_rate = 0;
        position.reserve_amount = 0;
    }

    if !is_long {
        let index_config = index_config.ok_or(ErrorCode::TokenConfigMissing)?;
        index_config.decrease_global_short_size(args.size_delta);
    }

    if usd_out > 0 {
        if is_long {
            let token_amount =
                usd_to_token_min(usd_out, collateral_max_price, collateral_config.decimals)?;
            collateral_config.decrease_pool_amount(token_amount)?;
        }
        return usd_to_token_min(
            usd_out_after_fee,
            collateral_max_price,
            collateral_config.decimals,
        );
    }

    Ok(0)
}

pub fn handler(ctx: Context<DecreasePosition>, params: DecreasePositionParams) -> Result<()> {
    let authority_key = ctx.accounts.authority.key();
    let owner_key = ctx.accounts.owner.key();
    validate_router(
        &authority_key,
        &owner_key,
        ctx.accounts.router_approval.as_ref(),
        ctx.program_id,
    )?;

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    update_cumulative_funding_rate(&mut ctx.accounts.collateral_config, &ctx.accounts.vault, now)?;

    let collateral_price = read_price(&ctx.accounts.collateral_oracle.to_account_info(), &clock)?;
    let index_price = if params.is_long {
        require_keys_eq!(
            ctx.accounts.index_oracle.key(),
            ctx.accounts.collateral_config.oracle,
            ErrorCode::OracleAccountMismatch
        );
        read_price(&ctx.accounts.collateral_oracle.to_account_info(), &clock)?
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
        require_keys_eq!(
            index_config.mint,
            ctx.accounts.position.index_mint,
            ErrorCode::InvalidParameter
        );
        read_price(&ctx.accounts.index_oracle.to_account_info(), &clock)?
    };

    let position_key = ctx.accounts.position.key();
    let collateral_balance = ctx.accounts.vault_token_account.amount;
    let args = DecreaseArgs {
        collateral_delta_usd: params.collateral_delta_usd,
        size_delta: params.size_delta,
    };

    let index_config = match ctx.accounts.index_config.as_mut() {
        Some(config) => Some(&mut ***config),
        None => None,
    };
    let amount_out = decrease_position_core(
        &ctx.accounts.vault,
        &mut ctx.accounts.collateral_config,
        index_config,
        &mut ctx.accounts.position,
        position_key,
        &args,
        &index_price,
        &collateral_price,
        collateral_balance,
        false,
        now,
    )?;

    if amount_out > 0 {
        let seeds: &[&[u8]] = &[VAULT_SEED, &[ctx.accounts.vault.bump]];
        let signer_seeds = &[seeds];
        anchor_spl::token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                anchor_spl::token::Transfer {
                    from: ctx.accounts.vault_token_account.to_account_info(),
                    to: ctx.accounts.receiver_token_account.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer_seeds,
            ),
            amount_out,
        )?;
        ctx.accounts.vault_token_account.reload()?;
        let balance = ctx.accounts.vault_token_account.amount;
        ctx.accounts
            .collateral_config
            .update_token_balance(balance);
    }

    if ctx.accounts.position.size == 0 {
        ctx.accounts
            .position
            .close(ctx.accounts.owner.to_account_info())?;
    }

    Ok(())
}
