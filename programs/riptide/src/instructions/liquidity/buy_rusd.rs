use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::BuyRusd as BuyRusdEvent;
use crate::instructions::validate_permission;
use crate::math::fees::get_buy_rusd_fee_basis_points;
use crate::math::fixed_point::{adjust_for_decimals, mul_div};
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::oracle::read_price;
use crate::state::{Permission, TokenConfig, Vault};

/// Deposit a whitelisted asset and mint RUSD against it at the asset's min
/// price, fee taken on the input.
#[derive(Accounts)]
pub struct BuyRusd<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
        constraint = token_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
    )]
    pub token_config: Box<Account<'info, TokenConfig>>,

    /// CHECK: price feed for the asset
    #[account(
        constraint = oracle.key() == token_config.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub oracle: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = funding_token_account.mint == token_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub funding_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = vault_token_account.key() == token_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = rusd_mint.key() == vault.rusd_mint @ ErrorCode::InvalidParameter,
    )]
    pub rusd_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = receiver_rusd_account.mint == vault.rusd_mint @ ErrorCode::InvalidParameter,
    )]
    pub receiver_rusd_account: Box<Account<'info, TokenAccount>>,

    /// Required while manager mode is active
    pub manager_permission: Option<Account<'info, Permission>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<BuyRusd>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

    let funder_key = ctx.accounts.funder.key();
    if ctx.accounts.vault.in_manager_mode {
        validate_permission(
            ctx.accounts.manager_permission.as_ref(),
            MANAGER_SEED,
            &[&funder_key],
            ctx.program_id,
            ErrorCode::ManagerRequired,
        )?;
    }

    // deposit, then take the inbound amount from the balance diff
    anchor_spl::token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.funding_token_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;
    ctx.accounts.vault_token_account.reload()?;
    let balance = ctx.accounts.vault_token_account.amount;

    let clock = Clock::get()?;
    let vault = &ctx.accounts.vault;
    let config = &mut ctx.accounts.token_config;

    let token_amount = balance
        .checked_sub(config.token_balance)
        .ok_or(ErrorCode::MathUnderflow)?;
    require!(token_amount > 0, ErrorCode::InvalidAmount);
    config.update_token_balance(balance);

    update_cumulative_funding_rate(config, vault, clock.unix_timestamp)?;

    let price = read_price(&ctx.accounts.oracle.to_account_info(), &clock)?;
    let min_price = price.min_price()?;

    let rusd_value = adjust_for_decimals(
        mul_div(token_amount as u128, min_price, PRICE_PRECISION)?,
        config.decimals,
        RUSD_DECIMALS,
    )?;
    require!(rusd_value > 0, ErrorCode::InvalidAmount);

    let rusd_supply = ctx.accounts.rusd_mint.supply as u128;
    let fee_basis_points = get_buy_rusd_fee_basis_points(vault, config, rusd_supply, rusd_value)?;
    let amount_after_fees = config.collect_swap_fees(token_amount, fee_basis_points, min_price)?;

    let mint_amount = adjust_for_decimals(
        mul_div(amount_after_fees as u128, min_price, PRICE_PRECISION)?,
        config.decimals,
        RUSD_DECIMALS,
    )?;

    config.increase_rusd_amount(mint_amount)?;
    config.increase_pool_amount(amount_after_fees, balance)?;

    let seeds: &[&[u8]] = &[VAULT_SEED, &[vault.bump]];
    let signer_seeds = &[seeds];
    anchor_spl::token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::MintTo {
                mint: ctx.accounts.rusd_mint.to_account_info(),
                to: ctx.accounts.receiver_rusd_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        u64::try_from(mint_amount).map_err(|_| ErrorCode::MathOverflow)?,
    )?;

    emit!(BuyRusdEvent {
        receiver: ctx.accounts.receiver_rusd_account.key(),
        token: ctx.accounts.token_config.mint,
        token_amount,
        rusd_amount: mint_amount,
        fee_basis_points,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
