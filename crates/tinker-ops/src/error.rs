use tinker_store::StoreError;
use tinker_types::{Amount, TypeError};

/// Errors from JSON mutation operations.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// No entry in the list at `path` matches `key`.
    #[error("target not found: no entry at {path} matching {key}")]
    TargetNotFound { path: String, key: String },

    /// The active set is full and the new power does not beat its smallest
    /// member.
    #[error("validator {address} with power {power} cannot enter a full active set (smallest power {minimum})")]
    InsufficientPower {
        address: String,
        power: Amount,
        minimum: Amount,
    },

    #[error("unknown tally parameter {0:?}")]
    UnknownTallyParam(String),

    #[error("invalid duration {0:?}: expected seconds such as \"1209600s\"")]
    InvalidDuration(String),

    /// An update would leave a negative amount behind.
    #[error("{key} at {path} would become negative ({amount})")]
    NegativeAmount {
        path: String,
        key: String,
        amount: String,
    },

    /// A required pool module account is not present.
    #[error("module account {0} not found in app_state.auth.accounts")]
    MissingPool(&'static str),

    /// An identity passed to an operation lacks a field the operation needs.
    #[error("{kind} identity has no {field}")]
    IncompleteIdentity {
        kind: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type OpsResult<T> = Result<T, OpsError>;

impl OpsError {
    pub(crate) fn not_found(path: &[&str], key: impl Into<String>) -> Self {
        Self::TargetNotFound {
            path: tinker_store::document::dotted(path),
            key: key.into(),
        }
    }
}
