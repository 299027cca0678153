pub mod clear_token_config;
pub mod initialize;
pub mod set_fees;
pub mod set_funding_rate;
pub mod set_permission;
pub mod set_token_config;
pub mod set_token_params;
pub mod set_vault_config;
pub mod upgrade_vault;
pub mod withdraw_fees;

pub use clear_token_config::*;
pub use initialize::*;
pub use set_fees::*;
pub use set_funding_rate::*;
pub use set_permission::*;
pub use set_token_config::*;
pub use set_token_params::*;
pub use set_vault_config::*;
pub use upgrade_vault::*;
pub use withdraw_fees::*;
