use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::{Permission, Vault};

#[derive(Accounts)]
pub struct SetManager<'info> {
    #[account(mut)]
    pub gov: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    /// CHECK: the account being granted or stripped of the manager role
    pub who: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = gov,
        space = Permission::LEN,
        seeds = [MANAGER_SEED, who.key().as_ref()],
        bump,
    )]
    pub permission: Account<'info, Permission>,

    pub system_program: Program<'info, System>,
}

pub fn set_manager(ctx: Context<SetManager>, active: bool) -> Result<()> {
    let permission = &mut ctx.accounts.permission;
    permission.active = active;
    permission.bump = ctx.bumps.permission;
    Ok(())
}

#[derive(Accounts)]
pub struct SetLiquidator<'info> {
    #[account(mut)]
    pub gov: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED],
        bump = vault.bump,
        constraint = vault.gov == gov.key() @ ErrorCode::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    /// CHECK: the account being granted or stripped of the liquidator role
    pub who: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = gov,
        space = Permission::LEN,
        seeds = [LIQUIDATOR_SEED, who.key().as_ref()],
        bump,
    )]
    pub permission: Account<'info, Permission>,

    pub system_program: Program<'info, System>,
}

pub fn set_liquidator(ctx: Context<SetLiquidator>, active: bool) -> Result<()> {
    let permission = &mut ctx.accounts.permission;
    permission.active = active;
    permission.bump = ctx.bumps.permission;
    Ok(())
}

/// Lets `owner` allow or revoke a router operating positions on its behalf.
#[derive(Accounts)]
pub struct ApproveRouter<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: the router being approved or revoked
    pub router: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = Permission::LEN,
        seeds = [ROUTER_SEED, owner.key().as_ref(), router.key().as_ref()],
        bump,
    )]
    pub permission: Account<'info, Permission>,

    pub system_program: Program<'info, System>,
}

pub fn approve_router(ctx: Context<ApproveRouter>, active: bool) -> Result<()> {
    let permission = &mut ctx.accounts.permission;
    permission.active = active;
    permission.bump = ctx.bumps.permission;
    Ok(())
}
