//! Persistence interface for the crag pipeline.
//!
//! This crate provides:
//! - The [`VideoStore`] and [`JobHistoryStore`] traits the core consumes
//! - A bundled in-process [`MemoryStore`] engine
//!
//! The pipeline only needs insert/query/update over integer-keyed records;
//! schema and engine choice belong to the embedding application, which may
//! substitute a database-backed implementation of the same traits.

pub mod error;
pub mod memory;
pub mod repos;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repos::{JobHistoryStore, VideoStore};
