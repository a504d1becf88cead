//! Model-level error types.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or validating records.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid download config: {0}")]
    InvalidConfig(String),

    #[error("Invalid date bound '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Payload is missing required field: {0}")]
    MissingField(&'static str),
}

impl ModelError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
