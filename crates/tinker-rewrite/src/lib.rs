//! Byte-phase identity rewriting for Genesis Tinker.
//!
//! Identity replacement works on the text of the genesis file, not on the
//! parsed tree: an address or key can appear anywhere (memo strings, map
//! keys, nested module state), and only a global literal substitution is
//! guaranteed to catch every occurrence.
//!
//! - [`ScratchFile`] -- the formatted working copy substitutions run on.
//! - [`plan_substitutions`] / [`apply_substitutions`] -- ordered,
//!   validated literal replacement.
//! - [`replace_validator`] / [`replace_delegator`] -- the two byte tasks.
//! - [`sort_balance_coins`] -- post-replacement normalisation.

pub mod error;
pub mod normalize;
pub mod scratch;
pub mod substitute;

pub use error::{RewriteError, RewriteResult};
pub use normalize::sort_balance_coins;
pub use scratch::ScratchFile;
pub use substitute::{
    apply_substitutions, plan_substitutions, replace_delegator, replace_validator, Substitution,
    SubstitutionReport,
};
