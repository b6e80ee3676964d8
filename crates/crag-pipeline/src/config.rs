//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory uploaded and compressed clips are stored under
    pub videos_dir: PathBuf,
    /// Interval between notification scans per connection
    pub notify_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("videos"),
            notify_interval: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            videos_dir: std::env::var("VIDEOS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("videos")),
            notify_interval: Duration::from_secs(
                std::env::var("NOTIFY_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}
