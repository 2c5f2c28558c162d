//! Command-line operations that work on local JAR files without a running server.

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::archive;
use crate::coordinate::Coordinate;
use crate::error::{AppError, UploadStage};
use crate::publish::{self, DescriptorOutcome, UploadRequest};
use crate::upstream::{Credentials, UpstreamClient, UpstreamConfig};

/// Utility for creating consistent spinners across long-running operations
struct ProgressBarManager {
    pb: ProgressBar,
}

impl ProgressBarManager {
    /// Create a new spinner with consistent styling
    fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Finish the spinner and clear it
    fn finish(self) {
        self.pb.finish_and_clear();
    }
}

/// Arguments for [`publish_jar`].
#[derive(Debug, Clone)]
pub struct PublishArgs {
    pub jar: PathBuf,
    pub nexus_url: String,
    pub repository: String,
    pub credentials: Credentials,
    /// Overrides for the coordinate; any left out is read from the JAR.
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub timestamp: Option<String>,
}

fn read_jar(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn coordinate_from_archive(path: &Path, data: &[u8]) -> Result<Coordinate> {
    let pom_xml = archive::extract_descriptor(data)
        .with_context(|| format!("Failed to read {} as a JAR", path.display()))?
        .ok_or(AppError::DescriptorNotFound)
        .with_context(|| format!("No META-INF/maven/**/pom.xml in {}", path.display()))?;
    let coordinate = Coordinate::from_descriptor(&pom_xml)
        .with_context(|| format!("Failed to resolve coordinates from {}", path.display()))?;
    debug!(coordinate = %coordinate, "Resolved coordinate from archive");
    Ok(coordinate)
}

/// Print the coordinate embedded in a JAR file.
pub fn inspect_jar(path: &Path, json: bool) -> Result<()> {
    let data = read_jar(path)?;
    let coordinate = coordinate_from_archive(path, &data)?;
    info!(jar = %path.display(), coordinate = %coordinate, "Inspected JAR");

    if json {
        println!("{}", serde_json::to_string_pretty(&coordinate)?);
        return Ok(());
    }

    println!("📦 {}", path.display().to_string().bold());
    println!("  groupId:    {}", coordinate.group_id.green());
    println!("  artifactId: {}", coordinate.artifact_id.green());
    println!("  version:    {}", coordinate.version.green());
    Ok(())
}

/// Fill in coordinate fields that were not given from the JAR's own pom.xml.
fn resolve_coordinate(args: &PublishArgs, data: &[u8]) -> Result<Coordinate> {
    let given = |value: &Option<String>| value.as_ref().filter(|v| !v.trim().is_empty()).cloned();
    let (group_id, artifact_id, version) = (
        given(&args.group_id),
        given(&args.artifact_id),
        given(&args.version),
    );

    if let (Some(group_id), Some(artifact_id), Some(version)) =
        (group_id.clone(), artifact_id.clone(), version.clone())
    {
        return Ok(Coordinate {
            group_id,
            artifact_id,
            version,
        });
    }

    let embedded = coordinate_from_archive(&args.jar, data)?;
    Ok(Coordinate {
        group_id: group_id.unwrap_or(embedded.group_id),
        artifact_id: artifact_id.unwrap_or(embedded.artifact_id),
        version: version.unwrap_or(embedded.version),
    })
}

/// Publish a local JAR and its embedded pom.xml to a remote repository.
pub async fn publish_jar(args: PublishArgs, upstream: UpstreamConfig) -> Result<()> {
    let data = read_jar(&args.jar)?;
    let coordinate = resolve_coordinate(&args, &data)?;
    let file_name = args
        .jar
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", args.jar.display()))?;

    println!("📤 Publishing {} to {}", coordinate.to_string().bold(), args.repository);
    if args.credentials.is_anonymous() {
        warn!("No username given, uploading without authentication");
    }

    let request = UploadRequest {
        nexus_url: args.nexus_url,
        repository: args.repository,
        credentials: args.credentials,
        group_id: coordinate.group_id,
        artifact_id: coordinate.artifact_id,
        version: coordinate.version,
        timestamp: args.timestamp,
        file_name,
        archive: Bytes::from(data),
    };

    let client = UpstreamClient::new(upstream).context("Failed to create HTTP client")?;
    let pb = ProgressBarManager::new("Uploading artifact and descriptor...");
    let result = publish::publish(&client, &request, Utc::now()).await;
    pb.finish();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Publish failed");
            if let AppError::RemoteUploadFailed { stage, status, .. } = &e {
                let status = status.map_or_else(|| "no response".to_string(), |s| s.to_string());
                println!("{} {} upload failed ({})", "❌".red(), stage, status);
            }
            if e.stage() == Some(UploadStage::Descriptor) {
                println!(
                    "   {}",
                    "The JAR is already published; its pom.xml is not.".yellow()
                );
            }
            return Err(e).context("Publishing failed");
        }
    };

    println!("  ✅ {}", outcome.target.jar_url);
    match outcome.descriptor {
        DescriptorOutcome::Uploaded => println!("  ✅ {}", outcome.target.pom_url),
        DescriptorOutcome::NotFound => println!(
            "  {} {}",
            "⚠️".yellow(),
            "No pom.xml in the JAR, only the artifact was published".yellow()
        ),
    }
    println!("✨ {}", "Artifacts uploaded successfully.".green());
    Ok(())
}
