//! Structured genesis mutations for Genesis Tinker.
//!
//! Every operation is a method on [`GenesisMutator`], which borrows the
//! parsed document, the mutation configuration and the run's step log. The
//! operations keep the genesis internally consistent:
//!
//! - bank: a balance change moves the denom's supply by the same delta, and
//!   coin lists stay sorted by denom;
//! - staking: token, share, power and pool changes move together, with the
//!   active validator set governed by an explicit [`ActiveSetPolicy`];
//! - governance: both the legacy `*_params` layout and the newer `params`
//!   layout are recognised.
//!
//! A missing target is always an error ([`OpsError::TargetNotFound`]); no
//! operation creates an account, validator or delegation out of thin air.

pub mod bank;
pub mod coins;
pub mod config;
pub mod error;
pub mod gov;
pub mod mutator;
pub mod staking;

pub use coins::Coin;
pub use config::{ActiveSetPolicy, MutationConfig, DEFAULT_MAX_VALIDATORS};
pub use error::{OpsError, OpsResult};
pub use gov::{GovLayout, TallyParam};
pub use mutator::GenesisMutator;
pub use staking::{BOND_STATUS_BONDED, BOND_STATUS_UNBONDED};
