//! # Error Handling and Response Types
//!
//! Every failure the publisher can report is an [`AppError`]. Handlers return
//! [`AppResult`] and let axum turn the error into a JSON response through the
//! [`IntoResponse`] implementation below, so nothing escapes the endpoint
//! boundary as an unhandled fault.
//!
//! ## Error Response Format
//!
//! ```json
//! {
//!   "message": "Upload failed.",
//!   "error": {"errors": [{"id": "*", "message": "Repository does not allow updating assets"}]},
//!   "code": "remote_upload_failed",
//!   "stage": "artifact",
//!   "artifactPublished": false,
//!   "timestamp": "2024-01-01T12:00:00Z"
//! }
//! ```
//!
//! `error`, `stage` and `artifactPublished` are omitted when they do not apply.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Standardized error response structure for consistent API error handling
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub message: String, // Human-readable summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>, // Underlying detail, remote body for upload failures
    pub code: String, // Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<UploadStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_published: Option<bool>,
    pub timestamp: String, // ISO 8601 timestamp
}

/// Which of the two sequential uploads an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Artifact,
    Descriptor,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::Artifact => f.write_str("artifact"),
            UploadStage::Descriptor => f.write_str("descriptor"),
        }
    }
}

/// Error code classification for machine-readable error types
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorCode {
    MissingFile,
    ValidationError,
    NotFound,
    DescriptorNotFound,
    InvalidArchive,
    MalformedDescriptor,
    IncompleteCoordinate,
    RemoteUploadFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingFile => "missing_file",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::DescriptorNotFound => "descriptor_not_found",
            ErrorCode::InvalidArchive => "invalid_archive",
            ErrorCode::MalformedDescriptor => "malformed_descriptor",
            ErrorCode::IncompleteCoordinate => "incomplete_coordinate",
            ErrorCode::RemoteUploadFailed => "remote_upload_failed",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

/// Application-specific error types with error codes
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("{0}")]
    BadRequest(String),

    #[error("Multipart form parsing error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("{0}")]
    NotFound(String),

    #[error("Could not find pom.xml in the JAR file.")]
    DescriptorNotFound,

    #[error("Error parsing JAR file.")]
    InvalidArchive(String),

    #[error("Error parsing JAR file.")]
    MalformedDescriptor(String),

    /// The artifact is already published but its archive could not be read
    /// to find the descriptor.
    #[error("Error parsing JAR file.")]
    UnreadableAfterPublish(String),

    #[error("Failed to parse essential coordinates from pom.xml.")]
    IncompleteCoordinate { missing: Vec<&'static str> },

    #[error("Upload failed.")]
    RemoteUploadFailed {
        stage: UploadStage,
        /// Status returned by the remote server; `None` when no response arrived.
        status: Option<u16>,
        body: String,
    },

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::MissingFile => ErrorCode::MissingFile,
            AppError::BadRequest(_) | AppError::Multipart(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::DescriptorNotFound => ErrorCode::DescriptorNotFound,
            AppError::InvalidArchive(_) | AppError::UnreadableAfterPublish(_) => {
                ErrorCode::InvalidArchive
            }
            AppError::MalformedDescriptor(_) => ErrorCode::MalformedDescriptor,
            AppError::IncompleteCoordinate { .. } => ErrorCode::IncompleteCoordinate,
            AppError::RemoteUploadFailed { .. } => ErrorCode::RemoteUploadFailed,
            AppError::InternalError(_) | AppError::Io(_) => ErrorCode::InternalError,
        }
    }

    /// HTTP status for this error. Remote upload failures forward the remote
    /// server's status when there was one.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::BadRequest(_)
            | AppError::Multipart(_)
            | AppError::IncompleteCoordinate { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::DescriptorNotFound => StatusCode::NOT_FOUND,
            AppError::RemoteUploadFailed {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::RemoteUploadFailed { status: None, .. }
            | AppError::InvalidArchive(_)
            | AppError::UnreadableAfterPublish(_)
            | AppError::MalformedDescriptor(_)
            | AppError::InternalError(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get additional error details if available
    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::InvalidArchive(detail)
            | AppError::UnreadableAfterPublish(detail)
            | AppError::MalformedDescriptor(detail) => Some(Value::String(detail.clone())),
            AppError::IncompleteCoordinate { missing } => Some(Value::String(format!(
                "missing {}",
                missing.join(", ")
            ))),
            AppError::RemoteUploadFailed { status, body, .. } => {
                if body.trim().is_empty() {
                    let fallback = match status {
                        Some(status) => format!("Remote server responded with status {status}"),
                        None => "An internal server error occurred.".to_string(),
                    };
                    Some(serde_json::json!({ "message": fallback }))
                } else {
                    Some(
                        serde_json::from_str(body)
                            .unwrap_or_else(|_| Value::String(body.clone())),
                    )
                }
            }
            AppError::InternalError(detail) => Some(Value::String(detail.clone())),
            AppError::Io(e) => Some(Value::String(e.to_string())),
            _ => None,
        }
    }

    /// Create a standardized error response
    pub fn to_error_response(&self) -> ApiErrorResponse {
        let stage = self.stage();
        ApiErrorResponse {
            message: self.to_string(),
            error: self.details(),
            code: self.error_code().as_str().to_string(),
            stage,
            artifact_published: stage.map(|stage| stage == UploadStage::Descriptor),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Upload stage a publishing error belongs to, if any.
    pub fn stage(&self) -> Option<UploadStage> {
        match self {
            AppError::RemoteUploadFailed { stage, .. } => Some(*stage),
            AppError::UnreadableAfterPublish(_) => Some(UploadStage::Descriptor),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let error_response = self.to_error_response();

        if status.is_server_error() {
            tracing::error!(error = %self, code = %error_response.code, "Request failed");
        } else {
            tracing::warn!(error = %self, code = %error_response.code, "Request rejected");
        }

        if self.stage() == Some(UploadStage::Descriptor) {
            tracing::warn!("Artifact is live on the remote repository but its descriptor is not");
        }

        tracing::debug!(status = %status, code = %error_response.code, "Returning standardized error response");

        (status, axum::Json(error_response)).into_response()
    }
}

/// Convenient result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(AppError::MissingFile.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DescriptorNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MalformedDescriptor("eof".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::IncompleteCoordinate {
                missing: vec!["artifactId"]
            }
            .http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn remote_failure_forwards_status() {
        let err = AppError::RemoteUploadFailed {
            stage: UploadStage::Artifact,
            status: Some(401),
            body: String::new(),
        };
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);

        let err = AppError::RemoteUploadFailed {
            stage: UploadStage::Artifact,
            status: None,
            body: String::new(),
        };
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn remote_failure_body_is_json_when_possible() {
        let err = AppError::RemoteUploadFailed {
            stage: UploadStage::Descriptor,
            status: Some(400),
            body: r#"{"reason":"bad"}"#.to_string(),
        };
        let response = err.to_error_response();
        assert_eq!(response.message, "Upload failed.");
        assert_eq!(response.error, Some(serde_json::json!({"reason": "bad"})));
        assert_eq!(response.stage, Some(UploadStage::Descriptor));
        assert_eq!(response.artifact_published, Some(true));

        let err = AppError::RemoteUploadFailed {
            stage: UploadStage::Artifact,
            status: Some(502),
            body: "Bad Gateway".to_string(),
        };
        let response = err.to_error_response();
        assert_eq!(response.error, Some(Value::String("Bad Gateway".into())));
        assert_eq!(response.artifact_published, Some(false));
    }

    #[test]
    fn unreadable_archive_after_publish_reports_partial_success() {
        let err = AppError::UnreadableAfterPublish("invalid Zip archive".into());
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::to_value(err.to_error_response()).unwrap();
        assert_eq!(body["message"], "Error parsing JAR file.");
        assert_eq!(body["code"], "invalid_archive");
        assert_eq!(body["stage"], "descriptor");
        assert_eq!(body["artifactPublished"], true);

        let plain = AppError::InvalidArchive("invalid Zip archive".into());
        assert_eq!(plain.stage(), None);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_fields() {
        let body = serde_json::to_value(AppError::DescriptorNotFound.to_error_response()).unwrap();
        assert_eq!(body["message"], "Could not find pom.xml in the JAR file.");
        assert_eq!(body["code"], "descriptor_not_found");
        assert!(body.get("error").is_none());
        assert!(body.get("artifactPublished").is_none());
    }
}
