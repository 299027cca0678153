use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::Swap as SwapEvent;
use crate::math::fees::get_swap_fee_basis_points;
use crate::math::fixed_point::{adjust_for_decimals, mul_div};
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::oracle::read_price;
use crate::state::{TokenConfig, Vault};

/// Swap one whitelisted asset for another through the pool, priced at the
/// input's min price against the output's max price. The fee is retained in
/// the output asset.
#[derive(Accounts)]
pub struct ExecuteSwap<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.is_swap_enabled @ ErrorCode::SwapsDisabled,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_in_config.mint.as_ref()],
        bump = token_in_config.bump,
        constraint = token_in_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
    )]
    pub token_in_config: Box<Account<'info, TokenConfig>>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_out_config.mint.as_ref()],
        bump = token_out_config.bump,
        constraint = token_out_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
        constraint = token_out_config.mint != token_in_config.mint @ ErrorCode::TokensMustDiffer,
    )]
    pub token_out_config: Box<Account<'info, TokenConfig>>,

    /// CHECK: price feed for the input asset
    #[account(
        constraint = token_in_oracle.key() == token_in_config.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub token_in_oracle: UncheckedAccount<'info>,

    /// CHECK: price feed for the output asset
    #[account(
        constraint = token_out_oracle.key() == token_out_config.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub token_out_oracle: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = funding_token_account.mint == token_in_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub funding_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = vault_token_in_account.key() == token_in_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_in_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = vault_token_out_account.key() == token_out_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_out_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == token_out_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub receiver_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = rusd_mint.key() == vault.rusd_mint @ ErrorCode::InvalidParameter,
    )]
    pub rusd_mint: Box<Account<'info, Mint>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ExecuteSwap>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

    let clock = Clock::get()?;
    let vault = &ctx.accounts.vault;

    update_cumulative_funding_rate(
        &mut ctx.accounts.token_in_config,
        vault,
        clock.unix_timestamp,
    )?;
    update_cumulative_funding_rate(
        &mut ctx.accounts.token_out_config,
        vault,
        clock.unix_timestamp,
    )?;

    // deposit, then take the inbound amount from the balance diff
    anchor_spl::token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.funding_token_account.to_account_info(),
                to: ctx.accounts.vault_token_in_account.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;
    ctx.accounts.vault_token_in_account.reload()?;
    let balance_in = ctx.accounts.vault_token_in_account.amount;

    let amount_in = balance_in
        .checked_sub(ctx.accounts.token_in_config.token_balance)
        .ok_or(ErrorCode::MathUnderflow)?;
    require!(amount_in > 0, ErrorCode::InvalidAmount);
    ctx.accounts
        .token_in_config
        .update_token_balance(balance_in);

    let price_in = read_price(&ctx.accounts.token_in_oracle.to_account_info(), &clock)?
        .min_price()?;
    let price_out_full = read_price(&ctx.accounts.token_out_oracle.to_account_info(), &clock)?;
    let price_out = price_out_full.max_price()?;
    let price_out_min = price_out_full.min_price()?;

    let in_decimals = ctx.accounts.token_in_config.decimals;
    let out_decimals = ctx.accounts.token_out_config.decimals;

    let amount_out = u64::try_from(adjust_for_decimals(
        mul_div(amount_in as u128, price_in, price_out)?,
        in_decimals,
        out_decimals,
    )?)
    .map_err(|_| ErrorCode::MathOverflow)?;

    let rusd_delta = adjust_for_decimals(
        mul_div(amount_in as u128, price_in, PRICE_PRECISION)?,
        in_decimals,
        RUSD_DECIMALS,
    )?;

    let fee_basis_points = get_swap_fee_basis_points(
        vault,
        &ctx.accounts.token_in_config,
        &ctx.accounts.token_out_config,
        ctx.accounts.rusd_mint.supply as u128,
        rusd_delta,
    )?;
    let amount_out_after_fees = ctx.accounts.token_out_config.collect_swap_fees(
        amount_out,
        fee_basis_points,
        price_out_min,
    )?;

    ctx.accounts.token_in_config.increase_rusd_amount(rusd_delta)?;
    ctx.accounts
        .token_out_config
        .decrease_rusd_amount(rusd_delta)?;

    ctx.accounts
        .token_in_config
        .increase_pool_amount(amount_in, balance_in)?;
    // the pool decrement re-checks the reserve and buffer floors on the way
    ctx.accounts
        .token_out_config
        .decrease_pool_amount(amount_out)?;

    let seeds: &[&[u8]] = &[VAULT_SEED, &[ctx.accounts.vault.bump]];
    let signer_seeds = &[seeds];
    anchor_spl::token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.vault_token_out_account.to_account_info(),
                to: ctx.accounts.receiver_token_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount_out_after_fees,
    )?;
    ctx.accounts.vault_token_out_account.reload()?;
    let balance_out = ctx.accounts.vault_token_out_account.amount;
    ctx.accounts
        .token_out_config
        .update_token_balance(balance_out);

    emit!(SwapEvent {
        receiver: ctx.accounts.receiver_token_account.key(),
        token_in: ctx.accounts.token_in_config.mint,
        token_out: ctx.accounts.token_out_config.mint,
        amount_in,
        amount_out,
        amount_out_after_fees,
        fee_basis_points,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
