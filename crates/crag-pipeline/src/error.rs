//! Pipeline error types.

use thiserror::Error;

use crate::registry::DuplicateJob;

/// Ingestion failure.
///
/// Any variant means the upload was rejected as a whole: no video record
/// and no job exist, and the raw file has been cleaned up where one was
/// written. The caller is responsible for rolling back whatever it was
/// attaching the clip to.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to prepare storage directory: {0}")]
    StorageDir(std::io::Error),

    #[error("failed to write upload: {0}")]
    WriteFailed(std::io::Error),

    #[error("failed to create video record: {0}")]
    Record(#[from] crag_store::StoreError),

    #[error(transparent)]
    Job(#[from] DuplicateJob),
}
