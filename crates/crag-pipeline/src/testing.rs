//! Test doubles for the pipeline's seams.
//!
//! Used by this crate's own tests and by embedding applications that want
//! to exercise the pipeline without ffmpeg or a live socket.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crag_media::{MediaError, MediaResult, Transcoder};

use crate::connections::{ChannelClosed, NotificationChannel};

/// Transcoder double: copies input to output, or fails on command.
pub struct StubTranscoder {
    fail: bool,
}

impl StubTranscoder {
    /// A transcoder whose every attempt succeeds.
    pub fn succeeding() -> Self {
        Self { fail: false }
    }

    /// A transcoder whose every attempt fails.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        if self.fail {
            return Err(MediaError::FfmpegFailed {
                code: Some(1),
                stderr: "simulated transcode failure".to_string(),
            });
        }
        let data = tokio::fs::read(input).await?;
        tokio::fs::write(output, data).await?;
        Ok(())
    }
}

/// Channel double that records every sent message.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send_text(&self, text: String) -> Result<(), ChannelClosed> {
        if self.is_closed() {
            return Err(ChannelClosed);
        }
        self.sent.lock().await.push(text);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
