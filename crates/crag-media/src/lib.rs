//! FFmpeg CLI wrapper for clip compression.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - An async runner over `tokio::process` (the child is a separate OS
//!   process, so the scheduler never blocks on a transcode)
//! - The [`Transcoder`] seam the pipeline depends on, with the production
//!   [`FfmpegTranscoder`] implementation

pub mod command;
pub mod error;
pub mod transcode;

pub use command::FfmpegCommand;
pub use error::{MediaError, MediaResult};
pub use transcode::{CompressSettings, FfmpegTranscoder, Transcoder};
