use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter is not initialized; call initialize with a first measurement")]
    NotInitialized,
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("measurement sequence is empty")]
    EmptySequence,
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
