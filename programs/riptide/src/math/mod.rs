pub mod fees;
pub mod fixed_point;
pub mod funding;
pub mod liquidation;
pub mod oracle;
pub mod position;

pub use fees::*;
pub use fixed_point::*;
pub use funding::*;
pub use liquidation::*;
pub use oracle::*;
pub use position::*;
