//! HTTP API endpoints for coordinate inspection and publishing.
//!
//! Both endpoints take a `multipart/form-data` body whose file part is named
//! `file`. A request that is not multipart at all is treated the same as one
//! without a file.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, OriginalUri, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::coordinate::Coordinate;
use crate::publish::{self, UploadRequest};
use crate::upstream::Credentials;
use crate::{archive, validation, AppError, AppResult, AppState, SuccessResponse};

/// Name of the multipart part carrying the archive.
pub const FILE_FIELD: &str = "file";

/// The file part of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// A decoded multipart form: at most one file plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Take a text field, empty when absent.
    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

/// Decode a multipart body, enforcing field-count and file-size limits.
pub async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
    max_file_size: u64,
) -> AppResult<UploadForm> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "Request body is not multipart");
        AppError::MissingFile
    })?;

    let mut form = UploadForm::default();
    let mut field_count = 0;

    while let Some(field) = multipart.next_field().await? {
        field_count += 1;
        if field_count > validation::MAX_MULTIPART_FIELDS {
            warn!(field_count, "Too many multipart fields");
            return Err(AppError::BadRequest(format!(
                "Too many multipart fields (max: {})",
                validation::MAX_MULTIPART_FIELDS
            )));
        }

        let name = field.name().unwrap_or("").to_string();
        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field.bytes().await?;

            // Browsers send an empty, unnamed part when no file was chosen.
            if file_name.is_empty() && data.is_empty() {
                debug!("Ignoring empty file part");
                continue;
            }

            if form.file.is_some() {
                warn!(file_name = %file_name, "Second file part in one request");
                return Err(AppError::BadRequest(format!(
                    "Only one '{FILE_FIELD}' part is allowed"
                )));
            }

            validation::validate_file_size(data.len() as u64, max_file_size)?;
            debug!(file_name = %file_name, size = data.len(), "Received file part");
            form.file = Some(UploadedFile { file_name, data });
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Read the coordinate out of an uploaded JAR's embedded pom.xml.
///
/// # Route
/// `POST /api/parse-jar`
///
/// # Example Response
/// ```json
/// {"groupId": "com.acme", "artifactId": "widget", "version": "1.0.0"}
/// ```
pub async fn parse_jar(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Coordinate>> {
    let form = read_upload_form(multipart, state.config.max_upload_size_bytes()).await?;
    let file = form.file.ok_or(AppError::MissingFile)?;
    info!(file_name = %file.file_name, size = file.data.len(), "Inspecting JAR");

    let pom_xml = archive::extract_descriptor(&file.data)?.ok_or(AppError::DescriptorNotFound)?;
    let coordinate = Coordinate::from_descriptor(&pom_xml)?;

    info!(coordinate = %coordinate, "Parsed coordinate from JAR");
    Ok(Json(coordinate))
}

/// Publish an uploaded JAR and its embedded pom.xml to a remote repository.
///
/// # Route
/// `POST /api/upload`
///
/// # Form Fields
/// `file`, `nexusUrl`, `repository`, `username`, `password`, `groupId`,
/// `artifactId`, `version`, and optionally `timestamp`.
///
/// # Returns
/// The status of the remote JAR upload with
/// `{"message": "Artifacts uploaded successfully."}`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<SuccessResponse>)> {
    let mut form = read_upload_form(multipart, state.config.max_upload_size_bytes()).await?;
    let file = form.file.take().ok_or(AppError::MissingFile)?;

    let timestamp = Some(form.take("timestamp")).filter(|t| !t.trim().is_empty());
    let request = UploadRequest {
        nexus_url: form.take("nexusUrl"),
        repository: form.take("repository"),
        credentials: Credentials::new(form.take("username"), form.take("password")),
        group_id: form.take("groupId"),
        artifact_id: form.take("artifactId"),
        version: form.take("version"),
        timestamp,
        file_name: file.file_name,
        archive: file.data,
    };

    info!(
        repository = %request.repository,
        group_id = %request.group_id,
        artifact_id = %request.artifact_id,
        version = %request.version,
        file_name = %request.file_name,
        "Publishing artifact"
    );

    let outcome = publish::publish(state.repository.as_ref(), &request, Utc::now()).await?;
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::OK);

    Ok((
        status,
        Json(SuccessResponse {
            message: "Artifacts uploaded successfully.".to_string(),
        }),
    ))
}

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "nexus-publisher",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fallback for unknown `/api` paths, so they never reach the web client.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("No API endpoint at {}", uri.path()))
}
