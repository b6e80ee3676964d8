//! Notification job types.
//!
//! A [`Job`] is the ephemeral, in-memory trace of one upload awaiting its
//! completion notification. It is never persisted; the durable audit trail
//! is the [`JobHistoryRecord`] written when the notification is delivered.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{RouteId, UserId, VideoId};

/// An in-flight notification job.
///
/// At most one job per `video_id` exists in the registry at a time. The
/// compression worker sets `completed` on success; one notification loop
/// then consumes the job exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Uploading user
    pub user_id: UserId,

    /// Video being transcoded
    pub video_id: VideoId,

    /// Route the clip is attached to
    pub route_id: RouteId,

    /// Transcode finished successfully
    #[serde(default)]
    pub completed: bool,
}

impl Job {
    /// Create a pending job for a freshly ingested upload.
    pub fn new(user_id: UserId, video_id: VideoId, route_id: RouteId) -> Self {
        Self {
            user_id,
            video_id,
            route_id,
            completed: false,
        }
    }
}

/// A persisted, append-only record of a delivered completion notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobHistoryRecord {
    /// Record id
    pub id: i64,

    /// When the notification was delivered
    pub created_at: DateTime<Utc>,

    /// Notified user
    pub user_id: UserId,

    /// Completed video
    pub video_id: VideoId,

    /// Route the clip is attached to
    pub route_id: RouteId,

    /// Always true; history rows are only written for delivered completions
    pub completed: bool,
}

/// Fields for appending a history record; the store assigns id and
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewJobHistory {
    pub user_id: UserId,
    pub video_id: VideoId,
    pub route_id: RouteId,
}

impl NewJobHistory {
    /// Build the history payload for a delivered job.
    pub fn for_job(job: &Job) -> Self {
        Self {
            user_id: job.user_id,
            video_id: job.video_id,
            route_id: job.route_id,
        }
    }
}
