use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::SellRusd as SellRusdEvent;
use crate::instructions::validate_permission;
use crate::math::fees::get_sell_rusd_fee_basis_points;
use crate::math::funding::update_cumulative_funding_rate;
use crate::math::oracle::read_price;
use crate::state::{Permission, TokenConfig, Vault};

/// Redeem RUSD for a whitelisted asset at the asset's max price, fee taken on
/// the output.
#[derive(Accounts)]
pub struct SellRusd<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,

    #[account(
        mut,
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
        constraint = funding_rusd_account.mint == vault.rusd_mint @ ErrorCode::InvalidParameter,
    )]
    pub funding_rusd_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = vault_rusd_account.key() == vault.rusd_token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_rusd_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = rusd_mint.key() == vault.rusd_mint @ ErrorCode::InvalidParameter,
    )]
    pub rusd_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = vault_token_account.key() == token_config.token_account @ ErrorCode::InvalidParameter,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == token_config.mint @ ErrorCode::InvalidParameter,
    )]
    pub receiver_token_account: Box<Account<'info, TokenAccount>>,

    /// Required while manager mode is active
    pub manager_permission: Option<Account<'info, Permission>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<SellRusd>, amount: u64) -> Result<()> {
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

    // RUSD comes in through the same deposit-then-diff path as assets
    anchor_spl::token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Transfer {
                from: ctx.accounts.funding_rusd_account.to_account_info(),
                to: ctx.accounts.vault_rusd_account.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;
    ctx.accounts.vault_rusd_account.reload()?;

    let clock = Clock::get()?;
    let rusd_amount = ctx
        .accounts
        .vault_rusd_account
        .amount
        .checked_sub(ctx.accounts.vault.rusd_balance)
        .ok_or(ErrorCode::MathUnderflow)?;
    require!(rusd_amount > 0, ErrorCode::InvalidAmount);
    ctx.accounts.vault.rusd_balance = ctx.accounts.vault_rusd_account.amount;

    {
        let vault = &ctx.accounts.vault;
        let config = &mut ctx.accounts.token_config;
        update_cumulative_funding_rate(config, vault, clock.unix_timestamp)?;
    }

    let price = read_price(&ctx.accounts.oracle.to_account_info(), &clock)?;
    let max_price = price.max_price()?;
    let min_price = price.min_price()?;

    let config = &mut ctx.accounts.token_config;
    let redemption_amount = config.get_redemption_amount(rusd_amount as u128, max_price)?;
    require!(redemption_amount > 0, ErrorCode::ZeroRedemption);

    config.decrease_rusd_amount(rusd_amount as u128)?;
    config.decrease_pool_amount(redemption_amount)?;

    // burn the deposited RUSD out of the vault's own account, then resync
    let seeds: &[&[u8]] = &[VAULT_SEED, &[ctx.accounts.vault.bump]];
    let signer_seeds = &[seeds];
    anchor_spl::token::burn(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            anchor_spl::token::Burn {
                mint: ctx.accounts.rusd_mint.to_account_info(),
                from: ctx.accounts.vault_rusd_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        rusd_amount,
    )?;
    ctx.accounts.vault_rusd_account.reload()?;
    ctx.accounts.vault.rusd_balance = ctx.accounts.vault_rusd_account.amount;
    ctx.accounts.rusd_mint.reload()?;

    let rusd_supply = ctx.accounts.rusd_mint.supply as u128;
    let fee_basis_points = get_sell_rusd_fee_basis_points(
        &ctx.accounts.vault,
        &ctx.accounts.token_config,
        rusd_supply,
        rusd_amount as u128,
    )?;
    let amount_out = ctx.accounts.token_config.collect_swap_fees(
        redemption_amount,
        fee_basis_points,
        min_price,
    )?;
    require!(amount_out > 0, ErrorCode::InvalidAmount);

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
    ctx.accounts.token_config.update_token_balance(balance);

    emit!(SellRusdEvent {
        receiver: ctx.accounts.receiver_token_account.key(),
        token: ctx.accounts.token_config.mint,
        rusd_amount: rusd_amount as u128,
        token_amount: amount_out,
        fee_basis_points,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
