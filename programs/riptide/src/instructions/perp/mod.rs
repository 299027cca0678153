pub mod decrease_position;
pub mod increase_position;
pub mod liquidate_position;
pub mod update_funding;

pub use decrease_position::*;
pub use increase_position::*;
pub use liquidate_position::*;
pub use update_funding::*;
