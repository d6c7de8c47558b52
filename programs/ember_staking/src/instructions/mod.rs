//! Instruction handlers for the Ember Staking program.
//!
//! This module contains all instruction implementations.

pub mod admin;
pub mod claim;
pub mod deposit;
pub mod emergency_withdraw;
pub mod fund_treasury;
pub mod initialize;
pub mod recover_token;
pub mod withdraw;

pub use admin::*;
pub use claim::*;
pub use deposit::*;
pub use emergency_withdraw::*;
pub use fund_treasury::*;
pub use initialize::*;
pub use recover_token::*;
pub use withdraw::*;
