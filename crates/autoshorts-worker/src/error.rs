//! Worker error types.

use thiserror::Error;

use autoshorts_models::ModelError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("YouTube error: {0}")]
    Youtube(#[from] autoshorts_youtube::YoutubeError),

    #[error("Storage error: {0}")]
    Storage(#[from] autoshorts_storage::StorageError),

    #[error("Database error: {0}")]
    Db(#[from] autoshorts_db::DbError),

    #[error("Media error: {0}")]
    Media(#[from] autoshorts_media::MediaError),

    #[error("Model error: {0}")]
    Model(#[source] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ModelError> for WorkerError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::Model(other),
        }
    }
}

impl WorkerError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::ExportFailed(msg.into())
    }

    /// The platform refused the request for quota reasons; later calls in
    /// the same run will fail the same way.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, WorkerError::Youtube(e) if e.is_quota_exceeded())
    }
}
