//! Upload ingestion.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crag_models::{Job, NewVideo, RouteId, UserId, VideoId};

use crate::error::IngestError;
use crate::pipeline::Pipeline;
use crate::worker;

/// Prefix a random token to the (possibly absent) suggested filename.
///
/// Uniqueness has to hold under concurrent uploads of identically named
/// files, so the token is a UUIDv4 rather than anything time-derived.
fn unique_name(suggested: Option<&str>) -> String {
    format!("{}-{}", Uuid::new_v4(), suggested.unwrap_or_default())
}

impl Pipeline {
    /// Ingest an uploaded clip for `user_id`, attached to `route_id`.
    ///
    /// Writes the raw bytes to disk, creates the video record (whose path
    /// already names the future compressed file), registers the
    /// notification job, and schedules compression in the background.
    /// Returns as soon as the record exists; the caller never waits on
    /// the transcode.
    ///
    /// On any failure before the job is registered, no partial state
    /// survives: a raw file written before a failed record insert is
    /// removed again.
    pub async fn ingest(
        &self,
        user_id: UserId,
        route_id: RouteId,
        data: &[u8],
        suggested_name: Option<&str>,
    ) -> Result<VideoId, IngestError> {
        fs::create_dir_all(&self.config.videos_dir)
            .await
            .map_err(IngestError::StorageDir)?;

        let raw_path: PathBuf = self.config.videos_dir.join(unique_name(suggested_name));
        let output_path: PathBuf = self.config.videos_dir.join(unique_name(suggested_name));

        fs::write(&raw_path, data)
            .await
            .map_err(IngestError::WriteFailed)?;

        let record = match self
            .videos
            .insert(NewVideo::new(output_path.to_string_lossy(), route_id))
            .await
        {
            Ok(record) => record,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&raw_path).await {
                    warn!("Failed to clean up raw upload {}: {}", raw_path.display(), rm);
                }
                return Err(e.into());
            }
        };

        self.registry
            .enqueue(Job::new(user_id, record.id, route_id))
            .await?;

        info!(
            "Ingested clip for user {} on route {}: video {} ({} bytes)",
            user_id,
            route_id,
            record.id,
            data.len()
        );

        tokio::spawn(worker::run_compression(
            Arc::clone(&self.videos),
            Arc::clone(&self.registry),
            Arc::clone(&self.transcoder),
            raw_path,
            output_path,
            record.id,
        ));

        Ok(record.id)
    }
}
