/// Errors from parsing foundation types.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The text is not a plain (optionally negative) decimal integer.
    #[error("invalid integer amount: {0:?}")]
    InvalidAmount(String),

    /// The text is not a decimal with at most 18 fractional digits.
    #[error("invalid decimal shares: {0:?}")]
    InvalidShares(String),
}
