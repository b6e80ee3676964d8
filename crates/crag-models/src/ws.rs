//! WebSocket message types.
//!
//! Messages pushed over a user's live notification channel. Only transcode
//! success is ever pushed; failures are left to be discovered by polling
//! the video record.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::VideoId;

/// WebSocket message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Transcode complete; the clip is ready
    Done {
        #[serde(rename = "videoId")]
        video_id: VideoId,
    },

    /// Channel-level error (bad handshake, eviction)
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl WsMessage {
    /// Create a done message.
    pub fn done(video_id: VideoId) -> Self {
        WsMessage::Done { video_id }
    }

    /// Create an error message.
    pub fn error(message: impl Into<String>) -> Self {
        WsMessage::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
