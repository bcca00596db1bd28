use tinker_crypto::DigestError;

/// Errors from loading, inspecting, or persisting a genesis document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A dotted path required by an accessor does not exist.
    #[error("missing path in genesis: {0}")]
    MissingPath(String),

    /// A path exists but holds the wrong JSON type.
    #[error("expected {expected} at {path}")]
    WrongType { path: String, expected: &'static str },

    /// The archive does not contain the genesis member.
    #[error("archive {archive} has no member {member}")]
    ArchiveMember { archive: String, member: String },

    /// Downloaded or local content does not match the expected checksum.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] DigestError),

    /// JSON parse or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Zip container failure.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error from the file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
