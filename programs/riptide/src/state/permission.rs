use anchor_lang::prelude::*;

/// Marker PDA for a granted role: manager (`[b"manager", who]`), liquidator
/// (`[b"liquidator", who]`), or router approval (`[b"router", owner, router]`).
#[account]
#[derive(Default)]
pub struct Permission {
    pub active: bool,
    pub bump: u8,
}

impl Permission {
    pub const LEN: usize = 8 + 1 + 1;
}
