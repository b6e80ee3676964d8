//! In-process reference store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crag_models::{JobHistoryRecord, NewJobHistory, NewVideo, UserId, VideoId, VideoRecord};

use crate::error::{StoreError, StoreResult};
use crate::repos::{JobHistoryStore, VideoStore};

/// In-memory store backing both repositories.
///
/// Sequential i64 ids, insertion-ordered tables. State lives for the
/// process lifetime only; this is the single-process reference engine.
#[derive(Default)]
pub struct MemoryStore {
    videos: RwLock<BTreeMap<i64, VideoRecord>>,
    history: RwLock<Vec<JobHistoryRecord>>,
    next_video_id: AtomicI64,
    next_history_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            videos: RwLock::new(BTreeMap::new()),
            history: RwLock::new(Vec::new()),
            next_video_id: AtomicI64::new(1),
            next_history_id: AtomicI64::new(1),
        }
    }

    /// Settle a record under the write lock, enforcing settle-once.
    async fn settle(&self, id: VideoId, completed: bool) -> StoreResult<()> {
        let mut videos = self.videos.write().await;
        let record = videos
            .get_mut(&id.as_i64())
            .ok_or(StoreError::VideoNotFound(id))?;
        if record.completed || record.failed {
            return Err(StoreError::AlreadySettled(id));
        }
        if completed {
            record.completed = true;
        } else {
            record.failed = true;
        }
        Ok(())
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn insert(&self, new: NewVideo) -> StoreResult<VideoRecord> {
        let id = VideoId::new(self.next_video_id.fetch_add(1, Ordering::SeqCst));
        let record = VideoRecord {
            id,
            path: new.path,
            route_id: new.route_id,
            completed: false,
            failed: false,
        };
        self.videos.write().await.insert(id.as_i64(), record.clone());
        info!("Created video record {}", id);
        Ok(record)
    }

    async fn get(&self, id: VideoId) -> StoreResult<Option<VideoRecord>> {
        Ok(self.videos.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_by_path(&self, path: &str) -> StoreResult<Option<VideoRecord>> {
        Ok(self
            .videos
            .read()
            .await
            .values()
            .find(|v| v.path == path)
            .cloned())
    }

    async fn mark_completed(&self, id: VideoId) -> StoreResult<()> {
        self.settle(id, true).await
    }

    async fn mark_failed(&self, id: VideoId) -> StoreResult<()> {
        self.settle(id, false).await
    }
}

#[async_trait]
impl JobHistoryStore for MemoryStore {
    async fn append(&self, new: NewJobHistory) -> StoreResult<JobHistoryRecord> {
        let record = JobHistoryRecord {
            id: self.next_history_id.fetch_add(1, Ordering::SeqCst),
            created_at: Utc::now(),
            user_id: new.user_id,
            video_id: new.video_id,
            route_id: new.route_id,
            completed: true,
        };
        self.history.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<JobHistoryRecord>> {
        Ok(self
            .history
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
