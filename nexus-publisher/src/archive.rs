//! Locating the embedded Maven descriptor inside a JAR.
//!
//! Maven writes a copy of the project descriptor to
//! `META-INF/maven/<groupId>/<artifactId>/pom.xml` when it packages a JAR.
//! Shaded or repackaged archives can carry several of these; the first entry
//! in the archive's own (central directory) order wins and no re-sorting is
//! done.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use zip::ZipArchive;

use crate::{AppError, AppResult};

/// Largest descriptor accepted from an archive, in decompressed bytes.
pub const MAX_DESCRIPTOR_BYTES: u64 = 4 * 1024 * 1024;

fn descriptor_entry_regex() -> &'static Regex {
    static DESCRIPTOR_ENTRY: OnceLock<Regex> = OnceLock::new();
    DESCRIPTOR_ENTRY.get_or_init(|| {
        Regex::new(r"META-INF/maven/.+/pom\.xml$").unwrap_or_else(|e| {
            panic!("Failed to compile descriptor entry regex: {}. This is a bug in the code - the regex pattern should be valid.", e)
        })
    })
}

/// Returns true when an archive entry name looks like an embedded pom.xml.
pub fn is_descriptor_entry(name: &str) -> bool {
    descriptor_entry_regex().is_match(name)
}

/// Extract the text of the embedded pom.xml from raw archive bytes.
///
/// Returns `Ok(None)` when the archive has no matching entry and
/// [`AppError::InvalidArchive`] when the bytes cannot be read as a zip archive
/// or the descriptor is larger than [`MAX_DESCRIPTOR_BYTES`].
pub fn extract_descriptor(archive: &[u8]) -> AppResult<Option<String>> {
    extract_descriptor_with_limit(archive, MAX_DESCRIPTOR_BYTES)
}

/// [`extract_descriptor`] with an explicit cap on the decompressed size.
///
/// Sizes recorded in the archive headers are not trusted; the entry is read
/// until the cap and rejected if there is more.
pub fn extract_descriptor_with_limit(archive: &[u8], max_bytes: u64) -> AppResult<Option<String>> {
    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| AppError::InvalidArchive(format!("Failed to open archive: {e}")))?;

    debug!(entries = zip.len(), "Scanning archive for embedded pom.xml");

    let Some(index) = (0..zip.len())
        .find(|&index| zip.name_for_index(index).is_some_and(is_descriptor_entry))
    else {
        return Ok(None);
    };

    let mut entry = zip
        .by_index(index)
        .map_err(|e| AppError::InvalidArchive(format!("Failed to read archive entry: {e}")))?;
    let entry_name = entry.name().to_string();

    let mut raw = Vec::new();
    entry
        .by_ref()
        .take(max_bytes + 1)
        .read_to_end(&mut raw)
        .map_err(|e| AppError::InvalidArchive(format!("Failed to read {entry_name}: {e}")))?;
    if raw.len() as u64 > max_bytes {
        return Err(AppError::InvalidArchive(format!(
            "{entry_name} exceeds {max_bytes} bytes"
        )));
    }

    debug!(entry = %entry_name, size = raw.len(), "Found embedded pom.xml");
    Ok(Some(decode_text(&raw)))
}

/// Decode descriptor bytes as UTF-8, dropping a leading byte-order mark.
fn decode_text(raw: &[u8]) -> String {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
