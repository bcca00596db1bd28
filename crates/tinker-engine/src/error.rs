use tinker_ops::OpsError;
use tinker_rewrite::RewriteError;
use tinker_store::StoreError;

/// Run-level errors.
#[derive(Debug, thiserror::Error)]
pub enum TinkerError {
    /// Byte tasks were submitted after json tasks.
    #[error(
        "invalid task order: replace_validator and replace_delegator must come before all \
         other operations (expected {expected:?}, submitted {submitted:?})"
    )]
    Sequencing {
        expected: Vec<&'static str>,
        submitted: Vec<&'static str>,
    },

    #[error("no tasks to run")]
    NoTasks,

    #[error("configuration error: {0}")]
    Config(String),

    /// A task plan references something it does not define.
    #[error("plan error: {0}")]
    Plan(String),

    #[error("plan parse error: {0}")]
    PlanSyntax(#[from] toml::de::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("operation failed: {0}")]
    Ops(#[from] OpsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TinkerResult<T> = Result<T, TinkerError>;
