//! # Publishing to a Maven-layout repository
//!
//! [`publish`] republishes an uploaded JAR and its embedded pom.xml to a
//! Nexus (or any Maven-layout) repository:
//!
//! 1. the remote filenames are resolved ([`crate::filename`]),
//! 2. the JAR is `PUT` to `<nexus>/repository/<repo>/<group/path>/<artifact>/<version>/<jar>`,
//! 3. the pom.xml is extracted from the same bytes and `PUT` next to it.
//!
//! The two uploads are strictly sequential. A failed JAR upload ends the
//! operation before the descriptor is touched, so the remote side never holds a
//! pom without its artifact. The reverse is possible: if the descriptor upload
//! fails the JAR is already live and stays there; the error says so through its
//! [`UploadStage`]. A JAR without an embedded pom.xml is published on its own.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::archive;
use crate::error::UploadStage;
use crate::filename::{self, ResolvedFilenames};
use crate::upstream::{Credentials, RemoteRepository, RemoteResponse};
use crate::validation;
use crate::{AppError, AppResult};

pub const JAR_CONTENT_TYPE: &str = "application/java-archive";
pub const POM_CONTENT_TYPE: &str = "application/xml";

/// Everything needed to publish one artifact.
///
/// Coordinates are taken as given; they are not re-derived from the archive,
/// so a caller may edit them between inspection and publishing.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub nexus_url: String,
    pub repository: String,
    pub credentials: Credentials,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Snapshot timestamp override; blank or absent means generate one.
    pub timestamp: Option<String>,
    /// Client-side name of the uploaded file.
    pub file_name: String,
    pub archive: Bytes,
}

impl UploadRequest {
    /// Check the structural preconditions of the request.
    pub fn validate(&self) -> AppResult<()> {
        let missing: Vec<&str> = [
            ("nexusUrl", &self.nexus_url),
            ("repository", &self.repository),
            ("groupId", &self.group_id),
            ("artifactId", &self.artifact_id),
            ("version", &self.version),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }

        validation::validate_base_url(&self.nexus_url)?;
        validation::validate_path_segment("repository", &self.repository)?;
        validation::validate_group_id(&self.group_id)?;
        validation::validate_path_segment("artifactId", &self.artifact_id)?;
        validation::validate_path_segment("version", &self.version)?;
        validation::validate_filename(&self.file_name)?;
        Ok(())
    }
}

/// Fully qualified upload URLs for the artifact and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub jar_url: String,
    pub pom_url: String,
}

impl RemoteTarget {
    /// `<nexus>/repository/<repo>/<group/path>/<artifact>/<version>/<file>`
    pub fn new(
        nexus_url: &str,
        repository: &str,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        filenames: &ResolvedFilenames,
    ) -> Self {
        let group_path = group_id.trim().replace('.', "/");
        let base = format!(
            "{}/repository/{}/{}/{}/{}",
            nexus_url.trim().trim_end_matches('/'),
            repository.trim(),
            group_path,
            artifact_id.trim(),
            version.trim()
        );
        RemoteTarget {
            jar_url: format!("{base}/{}", filenames.jar_filename),
            pom_url: format!("{base}/{}", filenames.pom_filename),
        }
    }
}

/// What happened to the descriptor after the artifact was published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorOutcome {
    Uploaded,
    /// The archive holds no pom.xml; only the artifact was published.
    NotFound,
}

/// Result of a successful [`publish`].
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// Status of the artifact upload, forwarded to API callers.
    pub status: u16,
    pub filenames: ResolvedFilenames,
    pub target: RemoteTarget,
    pub descriptor: DescriptorOutcome,
}

/// Publish the artifact and then its descriptor.
pub async fn publish(
    repository: &dyn RemoteRepository,
    request: &UploadRequest,
    now: DateTime<Utc>,
) -> AppResult<PublishOutcome> {
    request.validate()?;

    let version = request.version.trim();
    let filenames = filename::resolve_filenames(
        &request.file_name,
        version,
        request.artifact_id.trim(),
        request.timestamp.as_deref(),
        now,
    );
    // A custom snapshot timestamp ends up inside these names.
    validation::validate_filename(&filenames.jar_filename)?;
    validation::validate_filename(&filenames.pom_filename)?;

    let target = RemoteTarget::new(
        &request.nexus_url,
        &request.repository,
        &request.group_id,
        &request.artifact_id,
        version,
        &filenames,
    );

    info!(url = %target.jar_url, "Attempting to upload JAR");
    let jar_response = upload(
        repository,
        UploadStage::Artifact,
        &target.jar_url,
        request.archive.clone(),
        JAR_CONTENT_TYPE,
        &request.credentials,
    )
    .await?;
    info!(status = jar_response.status, "JAR upload successful");

    let embedded = archive::extract_descriptor(&request.archive).map_err(|e| match e {
        AppError::InvalidArchive(detail) => {
            warn!(error = %detail, "JAR is published but could not be read for its pom.xml");
            AppError::UnreadableAfterPublish(detail)
        }
        other => other,
    })?;

    let descriptor = match embedded {
        Some(pom_xml) => {
            info!(url = %target.pom_url, "Attempting to upload POM");
            upload(
                repository,
                UploadStage::Descriptor,
                &target.pom_url,
                Bytes::from(pom_xml),
                POM_CONTENT_TYPE,
                &request.credentials,
            )
            .await?;
            info!("POM upload successful");
            DescriptorOutcome::Uploaded
        }
        None => {
            warn!("No pom.xml found in JAR, skipping POM upload");
            DescriptorOutcome::NotFound
        }
    };

    Ok(PublishOutcome {
        status: jar_response.status,
        filenames,
        target,
        descriptor,
    })
}

async fn upload(
    repository: &dyn RemoteRepository,
    stage: UploadStage,
    url: &str,
    body: Bytes,
    content_type: &str,
    credentials: &Credentials,
) -> AppResult<RemoteResponse> {
    let response = repository
        .put(url, body, content_type, credentials)
        .await
        .map_err(|e| AppError::RemoteUploadFailed {
            stage,
            status: None,
            body: e.to_string(),
        })?;

    if !response.is_success() {
        warn!(%stage, status = response.status, url = %url, "Remote repository rejected upload");
        return Err(AppError::RemoteUploadFailed {
            stage,
            status: Some(response.status),
            body: response.body,
        });
    }
    Ok(response)
}
