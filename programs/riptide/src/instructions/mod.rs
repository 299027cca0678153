use anchor_lang::prelude::*;

use crate::constants::ROUTER_SEED;
use crate::error::ErrorCode;
use crate::state::Permission;

pub mod admin;
pub mod liquidity;
pub mod perp;

pub use admin::*;
pub use liquidity::*;
pub use perp::*;

/// Check that an optional role account is the expected permission PDA and is
/// active. `keys` are the seed components after the role prefix.
pub(crate) fn validate_permission(
    permission: Option<&Account<Permission>>,
    prefix: &[u8],
    keys: &[&Pubkey],
    program_id: &Pubkey,
    err: ErrorCode,
) -> Result<()> {
    let permission = permission.ok_or(err)?;
    let bump = [permission.bump];
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(keys.len() + 2);
    seeds.push(prefix);
    for key in keys {
        seeds.push(key.as_ref());
    }
    seeds.push(&bump);
    let expected = Pubkey::create_program_address(&seeds, program_id).map_err(|_| err)?;
    if permission.key() != expected || !permission.active {
        return Err(err.into());
    }
    Ok(())
}

/// Positions may be operated by their owner or by a router the owner has
/// approved.
pub(crate) fn validate_router(
    authority: &Pubkey,
    owner: &Pubkey,
    approval: Option<&Account<Permission>>,
    program_id: &Pubkey,
) -> Result<()> {
    if authority == owner {
        return Ok(());
    }
    validate_permission(
        approval,
        ROUTER_SEED,
        &[owner, authority],
        program_id,
        ErrorCode::RouterNotApproved,
    )
}
