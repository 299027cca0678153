use anchor_lang::prelude::*;
use anchor_lang::AccountsClose;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::{CollectMarginFees, LiquidatePosition as LiquidatePositionEvent};
use crate::instructions::perp::decrease_position::{decrease_position_core, DecreaseArgs};
use crate::instructions::validate_permission;
use crate::math::fixed_point::usd_to_token_min;
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::liquidation::{validate_liquidation, LiquidationState};
use crate::math::oracle::read_price;
use crate::state::{Permission, Position, TokenConfig, Vault};

#[derive(Accounts)]
pub struct LiquidatePositionCtx<'info> {
    pub liquidator: Signer<'info>,

    /// CHECK: the owner of the position being liquidated; receives the
    /// account rent and any force-close payout
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
            &[position.is_long as u8],
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
    pub index_oracle: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.key() == collateral_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    /// Receives the flat liquidation fee
    #[account(
        mut,
        constraint = fee_receiver_token_account.mint == collateral_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub fee_receiver_token_account: Box<Account<'info, TokenAccount>>,

    /// Receives the force-close payout when the position is merely
    /// over-leveraged
    #[account(
        mut,
        constraint = owner_token_account.mint == collateral_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub owner_token_account: Box<Account<'info, TokenAccount>>,

    /// Required while private liquidation mode is active
    pub liquidator_permission: Option<Account<'info, Permission>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<LiquidatePositionCtx>) -> Result<()> {
    let liquidator_key = ctx.accounts.liquidator.key();
    if ctx.accounts.vault.in_private_liquidation_mode {
        validate_permission(
            ctx.accounts.liquidator_permission.as_ref(),
            LIQUIDATOR_SEED,
            &[&liquidator_key],
            ctx.program_id,
            ErrorCode::LiquidatorRequired,
        )?;
    }

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    update_cumulative_funding_rate(&mut ctx.accounts.collateral_config, &ctx.accounts.vault, now)?;

    // price off the EMA aggregate throughout: single-slot price pushes must
    // not be able to force a seizure
    let collateral_price = read_price(&ctx.accounts.collateral_oracle.to_account_info(), &clock)?;
    let is_long = ctx.accounts.position.is_long;
    let (index_price, index_min_profit_bps) = if is_long {
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
        require_keys_eq!(
            index_config.mint,
            ctx.accounts.position.index_mint,
            ErrorCode::InvalidParameter
        );
        (
            read_price(&ctx.accounts.index_oracle.to_account_info(), &clock)?,
            index_config.min_profit_basis_points,
        )
    };

    let mark_price = index_price.get(!is_long, true)?;
    let (state, margin_fees) = validate_liquidation(
        &ctx.accounts.position,
        &ctx.accounts.vault,
        mark_price,
        ctx.accounts.collateral_config.cumulative_funding_rate,
        index_min_profit_bps,
        now,
        false,
    )?;
    require!(
        state != LiquidationState::Healthy,
        ErrorCode::PositionNotLiquidatable
    );

    let position_key = ctx.accounts.position.key();
    let collateral_balance = ctx.accounts.vault_token_account.amount;
    let seeds: &[&[u8]] = &[VAULT_SEED, &[ctx.accounts.vault.bump]];
    let signer_seeds = &[seeds];

    if state == LiquidationState::MaxLeverageExceeded {
        // over max leverage but still solvent: force a full close back to
        // the owner instead of seizing
        let size = ctx.accounts.position.size;
        let args = DecreaseArgs {
            collateral_delta_usd: 0,
            size_delta: size,
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
            true,
            now,
        )?;
        if amount_out > 0 {
            anchor_spl::token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    anchor_spl::token::Transfer {
                        from: ctx.accounts.vault_token_account.to_account_info(),
                        to: ctx.accounts.owner_token_account.to_account_info(),
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
        ctx.accounts
            .position
            .close(ctx.accounts.owner.to_account_info())?;
        return Ok(());
    }

    let collateral_max_price = collateral_price.get(true, true)?;
    let decimals = ctx.accounts.collateral_config.decimals;

    // seize: margin fees to the fee reserve, the rest of the accounting
    // unwinds the position's footprint
    let fee_tokens = usd_to_token_min(margin_fees, collateral_max_price, decimals)?;
    {
        let config = &mut ctx.accounts.collateral_config;
        config.fee_reserves = config
            .fee_reserves
            .checked_add(fee_tokens)
            .ok_or(ErrorCode::MathOverflow)?;
        emit!(CollectMarginFees {
            token: config.mint,
            fee_usd: margin_fees,
            fee_tokens,
        });
    }

    let position = &ctx.accounts.position;
    let size = position.size;
    let collateral = position.collateral;
    let reserve_amount = position.reserve_amount;
    let realised_pnl = position.realised_pnl;
    let collateral_mint = position.collateral_mint;
    let index_mint = position.index_mint;

    let config = &mut ctx.accounts.collateral_config;
    config.decrease_reserved_amount(reserve_amount)?;
    if is_long {
        config.decrease_guaranteed_usd(
            size.checked_sub(collateral).ok_or(ErrorCode::MathUnderflow)?,
        )?;
        config.decrease_pool_amount(usd_to_token_min(
            margin_fees,
            collateral_max_price,
            decimals,
        )?)?;
    }

    emit!(LiquidatePositionEvent {
        key: position_key,
        account: ctx.accounts.owner.key(),
        collateral_token: collateral_mint,
        index_token: index_mint,
        is_long,
        size,
        collateral,
        reserve_amount,
        realised_pnl,
        mark_price,
    });

    if !is_long {
        // whatever collateral the margin fees did not consume is the only
        // place short collateral flows back into the pool
        if margin_fees < collateral {
            let remaining_collateral = collateral - margin_fees;
            let config = &mut ctx.accounts.collateral_config;
            config.increase_pool_amount(
                usd_to_token_min(remaining_collateral, collateral_max_price, decimals)?,
                collateral_balance,
            )?;
        }
        let index_config = ctx
            .accounts
            .index_config
            .as_mut()
            .ok_or(ErrorCode::TokenConfigMissing)?;
        index_config.decrease_global_short_size(size);
    }

    let liquidation_fee_tokens = usd_to_token_min(
        ctx.accounts.vault.liquidation_fee_usd,
        collateral_max_price,
        decimals,
    )?;
    ctx.accounts
        .collateral_config
        .decrease_pool_amount(liquidation_fee_tokens)?;

    anchor_spl::token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.fee_receiver_token_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        liquidation_fee_tokens,
    )?;
    ctx.accounts.vault_token_account.reload()?;
    let balance = ctx.accounts.vault_token_account.amount;
    ctx.accounts
        .collateral_config
        .update_token_balance(balance);

    ctx.accounts
        .position
        .close(ctx.accounts.owner.to_account_info())?;

    Ok(())
}
