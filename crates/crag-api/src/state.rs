//! Application state.

use std::sync::Arc;

use crag_media::{CompressSettings, FfmpegTranscoder};
use crag_pipeline::{Pipeline, PipelineConfig};
use crag_store::{JobHistoryStore, MemoryStore, VideoStore};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub videos: Arc<dyn VideoStore>,
    pub history: Arc<dyn JobHistoryStore>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create new application state with the bundled in-process store and
    /// the ffmpeg transcoder.
    pub fn new(config: ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let videos: Arc<dyn VideoStore> = store.clone();
        let history: Arc<dyn JobHistoryStore> = store;

        let pipeline = Pipeline::new(
            Arc::clone(&videos),
            Arc::clone(&history),
            Arc::new(FfmpegTranscoder::new(CompressSettings::default())),
            PipelineConfig::from_env(),
        );

        Self {
            config,
            videos,
            history,
            pipeline: Arc::new(pipeline),
        }
    }
}
