//! Background compression worker.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{error, info, warn};

use crag_media::Transcoder;
use crag_models::VideoId;
use crag_store::VideoStore;

use crate::registry::JobRegistry;

/// Run one transcode to completion and settle the video record.
///
/// Spawned per upload; a single best-effort attempt with no retry. On
/// success the raw upload is deleted and the record found by its output
/// path is marked completed, then the registry job is flipped so the
/// owner's notification loop picks it up. On failure the record is marked
/// failed, the raw file stays on disk for operator inspection, and the
/// registry is left untouched — failures are never pushed.
pub(crate) async fn run_compression(
    videos: Arc<dyn VideoStore>,
    registry: Arc<JobRegistry>,
    transcoder: Arc<dyn Transcoder>,
    raw_path: PathBuf,
    output_path: PathBuf,
    video_id: VideoId,
) {
    match transcoder.transcode(&raw_path, &output_path).await {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&raw_path).await {
                warn!("Failed to remove raw upload {}: {}", raw_path.display(), e);
            }

            // The record's path is the output path chosen at ingest time;
            // it is the lookup key here, not the in-memory job.
            let output = output_path.to_string_lossy();
            match videos.find_by_path(&output).await {
                Ok(Some(record)) => {
                    if let Err(e) = videos.mark_completed(record.id).await {
                        error!("Failed to mark video {} completed: {}", record.id, e);
                        return;
                    }
                    info!("Transcode complete for video {}", record.id);
                    registry.mark_completed(video_id).await;
                }
                Ok(None) => {
                    error!("No video record found for output path {}", output);
                }
                Err(e) => {
                    error!("Record lookup failed for {}: {}", output, e);
                }
            }
        }
        Err(e) => {
            error!("Transcode failed for video {}: {}", video_id, e);
            if let Err(e) = videos.mark_failed(video_id).await {
                error!("Failed to mark video {} failed: {}", video_id, e);
            }
        }
    }
}
