//! Store traits consumed by the pipeline.

use async_trait::async_trait;

use crag_models::{JobHistoryRecord, NewJobHistory, NewVideo, UserId, VideoId, VideoRecord};

use crate::error::StoreResult;

/// Persistence for video records.
///
/// A record is mutated at most once after insert: exactly one of
/// `mark_completed` / `mark_failed`, by the compression worker.
/// Implementations must reject a second settlement.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new record and assign its id.
    async fn insert(&self, new: NewVideo) -> StoreResult<VideoRecord>;

    /// Get a record by id.
    async fn get(&self, id: VideoId) -> StoreResult<Option<VideoRecord>>;

    /// Find the record whose storage path matches exactly.
    ///
    /// The compression worker identifies its record this way: the output
    /// path was chosen at ingest time and stored as the record's path.
    async fn find_by_path(&self, path: &str) -> StoreResult<Option<VideoRecord>>;

    /// Mark the transcode successful.
    async fn mark_completed(&self, id: VideoId) -> StoreResult<()>;

    /// Mark the transcode failed (terminal, no retry).
    async fn mark_failed(&self, id: VideoId) -> StoreResult<()>;
}

/// Append-only persistence for delivered-notification history.
#[async_trait]
pub trait JobHistoryStore: Send + Sync {
    /// Append a history record; the store assigns id and timestamp.
    async fn append(&self, new: NewJobHistory) -> StoreResult<JobHistoryRecord>;

    /// List a user's history, oldest first.
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<JobHistoryRecord>>;
}
