//! The transcoder seam.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::MediaResult;

/// Compression parameters for uploaded clips.
#[derive(Debug, Clone)]
pub struct CompressSettings {
    /// Video codec
    pub video_codec: String,
    /// Constant rate factor (higher = smaller file)
    pub crf: u8,
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 30,
        }
    }
}

/// Re-encodes a raw upload into the smaller target format.
///
/// The pipeline depends on this trait rather than on ffmpeg directly;
/// tests substitute doubles for the success and failure paths.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `input` into `output`. A single best-effort attempt.
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// Production transcoder shelling out to ffmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    settings: CompressSettings,
}

impl FfmpegTranscoder {
    pub fn new(settings: CompressSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        info!(
            "Compressing {} -> {} ({}, crf {})",
            input.display(),
            output.display(),
            self.settings.video_codec,
            self.settings.crf
        );

        FfmpegCommand::new(input, output)
            .video_codec(&self.settings.video_codec)
            .crf(self.settings.crf)
            .run()
            .await
    }
}
