use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::WithdrawFees as WithdrawFeesEvent;
use crate::state::{TokenConfig, Vault};

#[derive(Accounts)]
pub struct WithdrawFees<'info> {
    pub gov: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED, token_config.mint.as_ref()],
        bump = token_config.bump,
    )]
    pub token_config: Account<'info, TokenConfig>,

    #[account(
        mut,
        constraint = vault_token_account.key() == token_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == token_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub receiver_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawFees>) -> Result<()> {
    let amount = ctx.accounts.token_config.fee_reserves;
    if amount == 0 {
        return Ok(());
    }

    let config = &mut ctx.accounts.token_config;
    config.fee_reserves = 0;

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
        amount,
    )?;

    ctx.accounts.vault_token_account.reload()?;
    let config = &mut ctx.accounts.token_config;
    config.update_token_balance(ctx.accounts.vault_token_account.amount);

    let clock = Clock::get()?;
    emit!(WithdrawFeesEvent {
        token: config.mint,
        amount,
        receiver: ctx.accounts.receiver_token_account.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
