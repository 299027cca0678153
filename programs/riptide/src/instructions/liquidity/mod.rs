pub mod buy_rusd;
pub mod direct_pool_deposit;
pub mod sell_rusd;
pub mod swap;

pub use buy_rusd::*;
pub use direct_pool_deposit::*;
pub use sell_rusd::*;
pub use swap::*;
