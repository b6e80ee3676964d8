//! Store error types.

use thiserror::Error;

use crag_models::VideoId;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("video not found: {0}")]
    VideoNotFound(VideoId),

    #[error("video already settled: {0}")]
    AlreadySettled(VideoId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
