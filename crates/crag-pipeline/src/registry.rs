//! In-memory registry of jobs awaiting notification.

use thiserror::Error;
use tokio::sync::Mutex;

use crag_models::{Job, UserId, VideoId};

/// A job for this video is already registered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a job for video {0} is already registered")]
pub struct DuplicateJob(pub VideoId);

/// Ordered table of in-flight jobs, keyed by video id.
///
/// Shared between upload handlers, compression workers, and every
/// notification loop; all access goes through one async mutex so that
/// scan-and-mutate sequences never interleave. Removal happens only
/// inside [`take_completed`](Self::take_completed), atomically with the
/// hand-off to the single caller, so a job reaches at most one consumer.
///
/// Entries for users who disconnect before their transcode finishes stay
/// behind until process exit; nothing else consumes them.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<Vec<Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Append a pending job. At most one job per video id may exist.
    pub async fn enqueue(&self, job: Job) -> Result<(), DuplicateJob> {
        let mut jobs = self.jobs.lock().await;
        if jobs.iter().any(|j| j.video_id == job.video_id) {
            return Err(DuplicateJob(job.video_id));
        }
        jobs.push(job);
        Ok(())
    }

    /// Flip a job to completed. Returns false if no such job is registered.
    pub async fn mark_completed(&self, video_id: VideoId) -> bool {
        let mut jobs = self.jobs.lock().await;
        match jobs.iter_mut().find(|j| j.video_id == video_id) {
            Some(job) => {
                job.completed = true;
                true
            }
            None => false,
        }
    }

    /// Atomically remove and return this user's completed jobs, in
    /// registration order.
    pub async fn take_completed(&self, user_id: UserId) -> Vec<Job> {
        let mut jobs = self.jobs.lock().await;
        let mut taken = Vec::new();
        jobs.retain(|j| {
            if j.user_id == user_id && j.completed {
                taken.push(j.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    /// Number of jobs (any state) registered for a user.
    pub async fn pending_for(&self, user_id: UserId) -> usize {
        self.jobs
            .lock()
            .await
            .iter()
            .filter(|j| j.user_id == user_id)
            .count()
    }

    /// Whether a job for this video is still registered.
    pub async fn contains(&self, video_id: VideoId) -> bool {
        self.jobs.lock().await.iter().any(|j| j.video_id == video_id)
    }

    /// Total number of registered jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
