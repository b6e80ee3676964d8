//! Axum HTTP/WS API server.
//!
//! This crate provides:
//! - Multipart clip upload attached to a route
//! - Video status polling and per-user job history
//! - The per-user WebSocket notification endpoint
//!
//! Authentication is owned by the fronting gateway; handlers receive an
//! already-verified numeric user id.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
