//! Foundation types for Genesis Tinker.
//!
//! This crate holds the small value types every other crate shares:
//!
//! - [`Validator`] and [`Delegator`] -- identity records whose fields are
//!   substituted during the byte phase, enumerated through [`IdentityField`]
//!   in a fixed declaration order.
//! - [`Amount`] -- an exact, arbitrary-precision integer token amount,
//!   rendered as a plain decimal string.
//! - [`Shares`] -- an exact 18-decimal fixed-point value used for delegator
//!   shares and starting stakes.
//! - [`StepLog`] -- the numbered progress log owned by each run.

pub mod amount;
pub mod error;
pub mod identity;
pub mod steps;

pub use amount::{Amount, Shares, POWER_TO_TOKENS, SHARE_DECIMALS};
pub use error::TypeError;
pub use identity::{Delegator, Identity, IdentityField, Validator};
pub use steps::StepLog;
