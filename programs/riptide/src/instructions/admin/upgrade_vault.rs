use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::UpgradeVault as UpgradeVaultEvent;
use crate::state::{TokenConfig, Vault};

/// Moves custodial funds to a successor vault's token account during a
/// migration. The ledger on this side is left untouched apart from the
/// balance resync; the successor imports it out of band.
#[derive(Accounts)]
pub struct UpgradeVault<'info> {
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
        constraint = new_vault_token_account.mint == token_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub new_vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<UpgradeVault>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

    let seeds: &[&[u8]] = &[VAULT_SEED, &[ctx.accounts.vault.bump]];
    let signer_seeds = &[seeds];
    anchor_spl::token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.new_vault_token_account.to_account_info(),
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
    emit!(UpgradeVaultEvent {
        token: config.mint,
        new_vault_token_account: ctx.accounts.new_vault_token_account.key(),
        amount,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
