use tinker_store::StoreError;
use tinker_types::IdentityField;

/// Errors from the byte phase.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The old identity sets a field the new identity leaves unset.
    #[error("{kind} field {field} is set on the old identity but missing on the new one")]
    MissingField {
        kind: &'static str,
        field: IdentityField,
    },

    /// A literal that would break the JSON text or match everything.
    #[error("invalid literal for {field}: {literal:?}")]
    InvalidLiteral { field: IdentityField, literal: String },

    /// The scratch file no longer parses as JSON.
    #[error("malformed scratch JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The scratch file is not UTF-8.
    #[error("scratch file is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RewriteResult<T> = Result<T, RewriteError>;
