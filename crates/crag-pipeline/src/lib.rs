//! Asynchronous clip pipeline.
//!
//! This crate provides:
//! - Upload ingestion to collision-free storage paths
//! - Out-of-band compression via the media crate's transcoder seam
//! - An in-memory registry of jobs awaiting notification
//! - One live notification channel per user, with eviction
//! - The per-connection notification loop
//!
//! The surrounding application supplies identity, persistence, and a
//! duplex transport; everything here is single-process and best-effort.

pub mod config;
pub mod connections;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod registry;
pub mod testing;
mod worker;

pub use config::PipelineConfig;
pub use connections::{ChannelClosed, ConnectionManager, NotificationChannel};
pub use error::IngestError;
pub use notify::NotificationSession;
pub use pipeline::Pipeline;
pub use registry::{DuplicateJob, JobRegistry};
