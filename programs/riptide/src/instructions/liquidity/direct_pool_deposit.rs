use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::DirectPoolDeposit as DirectPoolDepositEvent;
use crate::state::TokenConfig;

/// Credits tokens to the pool without minting RUSD against them; used to
/// seed or donate liquidity.
#[derive(Accounts)]
pub struct DirectPoolDeposit<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
        constraint = token_config.whitelisted @ ErrorCode::TokenNotWhitelisted,
    )]
    pub token_config: Account<'info, TokenConfig>,

    #[account(
        mut,
        constraint = funding_token_account.mint == token_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub funding_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.key() == token_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<DirectPoolDeposit>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

    anchor_spl::token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.funding_token_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.vault_token_account.reload()?;
    let balance = ctx.accounts.vault_token_account.amount;

    let config = &mut ctx.accounts.token_config;
    let token_amount = balance
        .checked_sub(config.token_balance)
        .ok_or(ErrorCode::MathUnderflow)?;
    require!(token_amount > 0, ErrorCode::InvalidAmount);
    config.update_token_balance(balance);

    config.increase_pool_amount(token_amount, balance)?;

    let clock = Clock::get()?;
    emit!(DirectPoolDepositEvent {
        token: config.mint,
        amount: token_amount,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
