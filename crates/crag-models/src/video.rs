//! Video record types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{RouteId, VideoId};

/// A persisted video record.
///
/// Created at upload time with `path` already pointing at the *future*
/// compressed file; the compression worker later flips exactly one of
/// `completed` or `failed`. Records are never deleted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Record id
    pub id: VideoId,

    /// Storage path of the compressed output
    pub path: String,

    /// Route this clip is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,

    /// Transcode finished successfully
    #[serde(default)]
    pub completed: bool,

    /// Transcode failed (terminal, no retry)
    #[serde(default)]
    pub failed: bool,
}

impl VideoRecord {
    /// Whether the transcode has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.completed || self.failed
    }
}

/// Fields for inserting a new video record; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewVideo {
    /// Storage path of the compressed output
    pub path: String,

    /// Route this clip is attached to
    pub route_id: Option<RouteId>,
}

impl NewVideo {
    /// Create an insert payload for a clip attached to a route.
    pub fn new(path: impl Into<String>, route_id: RouteId) -> Self {
        Self {
            path: path.into(),
            route_id: Some(route_id),
        }
    }
}
