pub mod permission;
pub mod position;
pub mod token_config;
pub mod vault;

pub use permission::*;
pub use position::*;
pub use token_config::*;
pub use vault::*;
