//! Instruction handlers for the JBC protocol.

pub mod admin;
pub mod claim;
pub mod corrections;
pub mod initialize;
pub mod liquidity;
pub mod redeem;
pub mod referral;
pub mod stake;
pub mod swap;
pub mod ticket;
pub mod views;

pub use admin::*;
pub use claim::*;
pub use corrections::*;
pub use initialize::*;
pub use liquidity::*;
pub use redeem::*;
pub use referral::*;
pub use stake::*;
pub use swap::*;
pub use ticket::*;
pub use views::*;
