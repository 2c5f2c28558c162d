//! # Input Validation
//!
//! Checks applied to request input before any of it reaches a remote URL.
//! They guard structure only: a value that passes can still be rejected by
//! the remote repository, which has the final say on what it accepts.

use url::Url;

use crate::{AppError, AppResult};

/// Maximum allowed number of multipart fields in one request
pub const MAX_MULTIPART_FIELDS: usize = 16;

/// Maximum allowed filename length
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum allowed length for a single coordinate or repository segment
pub const MAX_SEGMENT_LENGTH: usize = 255;

/// Validate an uploaded file's size against a limit in bytes.
pub fn validate_file_size(size: u64, max: u64) -> AppResult<()> {
    if size > max {
        return Err(AppError::BadRequest(format!(
            "File too large: {size} bytes (max: {max} bytes)"
        )));
    }
    Ok(())
}

/// Validates a filename before it becomes the last URL segment.
///
/// Rejects empty or overlong names, path separators, `..`, URL delimiters
/// (`?`, `#`, `%`) and control characters. Applied to the uploaded name and
/// again to the resolved remote names.
pub fn validate_filename(filename: &str) -> AppResult<()> {
    if filename.is_empty() {
        return Err(AppError::BadRequest("Filename cannot be empty".to_string()));
    }
    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Filename too long: {} characters (max: {MAX_FILENAME_LENGTH})",
            filename.len()
        )));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(AppError::BadRequest(
            "Filename cannot contain path separators".to_string(),
        ));
    }
    if filename.contains("..") {
        return Err(AppError::BadRequest(
            "Filename cannot contain '..'".to_string(),
        ));
    }
    if let Some(bad) = filename.chars().find(|c| matches!(c, '?' | '#' | '%')) {
        return Err(AppError::BadRequest(format!(
            "Filename cannot contain {bad:?}"
        )));
    }
    if filename.chars().any(char::is_control) {
        return Err(AppError::BadRequest(
            "Filename cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate one path segment (repository id, artifactId, version).
pub fn validate_path_segment(field: &str, value: &str) -> AppResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }
    if value.len() > MAX_SEGMENT_LENGTH {
        return Err(AppError::BadRequest(format!("{field} is too long")));
    }
    if value == "." || value == ".." {
        return Err(AppError::BadRequest(format!("{field} cannot be '{value}'")));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control() || c.is_whitespace())
    {
        return Err(AppError::BadRequest(format!(
            "{field} contains invalid character {bad:?}"
        )));
    }
    Ok(())
}

/// Validate a groupId; every dot-separated part must be a valid segment.
pub fn validate_group_id(group_id: &str) -> AppResult<()> {
    let group_id = group_id.trim();
    if group_id.is_empty() {
        return Err(AppError::BadRequest("groupId cannot be empty".to_string()));
    }
    for part in group_id.split('.') {
        if part.is_empty() {
            return Err(AppError::BadRequest(format!(
                "groupId '{group_id}' contains an empty segment"
            )));
        }
        validate_path_segment("groupId", part)?;
    }
    Ok(())
}

/// Validate the remote repository base URL: absolute, http(s), no query.
pub fn validate_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid nexusUrl '{}': {e}", raw.trim())))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(format!(
            "nexusUrl must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(AppError::BadRequest("nexusUrl must include a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(AppError::BadRequest(
            "nexusUrl cannot contain a query or fragment".to_string(),
        ));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(AppError::BadRequest(
            "nexusUrl cannot embed credentials; use username and password".to_string(),
        ));
    }
    Ok(url)
}
