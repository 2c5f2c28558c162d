//! # Nexus Publisher
//!
//! Reads Maven coordinates out of JAR archives and publishes a JAR together
//! with its embedded pom.xml to a Nexus-style hosted repository.
//!
//! ## Features
//!
//! - **Coordinate inspection**: locates `META-INF/maven/**/pom.xml` inside an
//!   archive and derives `groupId:artifactId:version`, inheriting from
//!   `<parent>` where Maven does
//! - **Publishing**: uploads the JAR, then its descriptor, to the Maven 2
//!   layout path of a hosted repository
//! - **Snapshot naming**: rewrites `-SNAPSHOT` file names to the timestamped
//!   form remote repositories expect
//! - **Web UI**: serves a single-page client next to the JSON API
//!
//! ## Key Modules
//!
//! - [`archive`]: descriptor lookup inside ZIP archives
//! - [`descriptor`]: minimal XML tree for pom.xml documents
//! - [`coordinate`]: coordinate extraction with parent inheritance
//! - [`filename`]: remote file naming, including snapshots
//! - [`publish`]: the two-step upload workflow
//! - [`upstream`]: outbound HTTP client for the remote repository
//! - [`api`]: HTTP API endpoints
//! - [`server`]: routing and server startup
//! - [`client_ops`]: command-line operations
//!
//! ## Usage
//!
//! The main entry point is the `nexus-publisher` binary, but the library
//! exposes coordinate extraction and publishing for direct use.

pub mod api;
pub mod archive;
pub mod client_ops;
pub mod config;
pub mod coordinate;
pub mod descriptor;
pub mod error;
pub mod filename;
pub mod publish;
pub mod server;
pub mod state;
pub mod upstream;
pub mod validation;

// Re-export key types for convenience
pub use client_ops::{inspect_jar, publish_jar, PublishArgs};
pub use config::Config;
pub use coordinate::Coordinate;
pub use error::{ApiErrorResponse, AppError, AppResult, ErrorCode, UploadStage};
pub use publish::{publish, PublishOutcome, RemoteTarget, UploadRequest};
pub use server::{build_router, create_state, run_server, run_server_with_shutdown};
pub use state::{AppState, SuccessResponse};
pub use upstream::{Credentials, RemoteRepository, UpstreamClient, UpstreamConfig};
