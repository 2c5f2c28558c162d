//! # Application State Management
//!
//! [`AppState`] is built once at startup and shared read-only by every
//! request handler behind an `Arc`. Nothing in it changes after startup, so
//! concurrent requests need no locking.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nexus_publisher::{AppState, Config, UpstreamClient, UpstreamConfig};
//!
//! let state = Arc::new(AppState {
//!     config: Arc::new(Config::default()),
//!     repository: Arc::new(UpstreamClient::new(UpstreamConfig::default())?),
//! });
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::Config;
use crate::upstream::RemoteRepository;
use serde::Serialize;
use std::sync::Arc;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Client used to upload artifacts to the remote repository
    pub repository: Arc<dyn RemoteRepository>,
}

/// Standardized success response for API consistency.
///
/// Serializes to: `{"message": "Artifacts uploaded successfully."}`
#[derive(Serialize)]
pub struct SuccessResponse {
    /// Human-readable success message describing the completed operation
    pub message: String,
}
