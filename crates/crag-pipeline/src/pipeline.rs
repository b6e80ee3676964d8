//! Pipeline assembly.

use std::sync::Arc;

use crag_media::Transcoder;
use crag_store::{JobHistoryStore, VideoStore};

use crate::config::PipelineConfig;
use crate::connections::ConnectionManager;
use crate::registry::JobRegistry;

/// The assembled clip pipeline.
///
/// Owns the job registry and connection manager; borrows persistence and
/// transcoding through their trait seams. One instance is shared across
/// all upload handlers and notification connections.
pub struct Pipeline {
    pub(crate) videos: Arc<dyn VideoStore>,
    pub(crate) history: Arc<dyn JobHistoryStore>,
    pub(crate) transcoder: Arc<dyn Transcoder>,
    pub(crate) registry: Arc<JobRegistry>,
    pub(crate) connections: Arc<ConnectionManager>,
    pub(crate) config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        history: Arc<dyn JobHistoryStore>,
        transcoder: Arc<dyn Transcoder>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            videos,
            history,
            transcoder,
            registry: Arc::new(JobRegistry::new()),
            connections: Arc::new(ConnectionManager::new()),
            config,
        }
    }

    /// The in-flight job table.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// The live-connection table.
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
