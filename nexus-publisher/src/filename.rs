//! Remote filename resolution for artifacts and their descriptors.
//!
//! Release artifacts keep the name they were uploaded with. Snapshot
//! artifacts are renamed to the unique, timestamped form a Maven repository
//! stores them under:
//!
//! ```text
//! widget-2.0-SNAPSHOT.jar  →  widget-2.0-20240101.120000-1.jar
//! ```
//!
//! while the `-SNAPSHOT` version stays in the directory path. Automatic
//! timestamps always carry build number [`DEFAULT_BUILD_NUMBER`]; the remote
//! `maven-metadata.xml` is never consulted for the next build number, so two
//! automatic uploads within the same second produce the same name.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Suffix marking a Maven snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Build number used for generated snapshot timestamps.
pub const DEFAULT_BUILD_NUMBER: u32 = 1;

fn timestamped_snapshot_regex() -> &'static Regex {
    static TIMESTAMPED: OnceLock<Regex> = OnceLock::new();
    TIMESTAMPED.get_or_init(|| {
        Regex::new(r"[0-9]{8}\.[0-9]{6}-[0-9]+").unwrap_or_else(|e| {
            panic!("Failed to compile snapshot timestamp regex: {}. This is a bug in the code - the regex pattern should be valid.", e)
        })
    })
}

/// Remote names for the artifact and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilenames {
    pub jar_filename: String,
    pub pom_filename: String,
}

/// Returns true if `filename` already carries a `yyyyMMdd.HHmmss-N` stamp.
pub fn is_timestamped_snapshot(filename: &str) -> bool {
    timestamped_snapshot_regex().is_match(filename)
}

/// Format a snapshot timestamp for `now` with the default build number.
pub fn snapshot_timestamp(now: DateTime<Utc>) -> String {
    format!("{}-{}", now.format("%Y%m%d.%H%M%S"), DEFAULT_BUILD_NUMBER)
}

/// Swap a trailing `.jar` for `.pom`; names without `.jar` get `.pom` appended
/// instead of being left unchanged, so the pom never overwrites the artifact.
pub fn pom_name_for(jar_filename: &str) -> String {
    let stem = jar_filename.strip_suffix(".jar").unwrap_or(jar_filename);
    format!("{stem}.pom")
}

/// Decide the remote filenames for an upload.
///
/// * `original_filename` - the client-side name of the uploaded file
/// * `version` - the requested version, possibly ending in `-SNAPSHOT`
/// * `artifact_id` - used to build the timestamped snapshot name
/// * `timestamp` - caller override for the snapshot stamp; blank means generate
/// * `now` - instant used when a stamp has to be generated
pub fn resolve_filenames(
    original_filename: &str,
    version: &str,
    artifact_id: &str,
    timestamp: Option<&str>,
    now: DateTime<Utc>,
) -> ResolvedFilenames {
    let Some(version_base) = version.strip_suffix(SNAPSHOT_SUFFIX) else {
        return passthrough(original_filename);
    };
    if is_timestamped_snapshot(original_filename) {
        return passthrough(original_filename);
    }

    let final_timestamp = match timestamp.map(str::trim).filter(|t| !t.is_empty()) {
        Some(custom) => {
            tracing::info!(timestamp = %custom, "Using custom snapshot timestamp");
            custom.to_string()
        }
        None => {
            let generated = snapshot_timestamp(now);
            tracing::info!(timestamp = %generated, "Generated automatic snapshot timestamp");
            generated
        }
    };

    let jar_filename = format!("{artifact_id}-{version_base}-{final_timestamp}.jar");
    let pom_filename = pom_name_for(&jar_filename);
    ResolvedFilenames {
        jar_filename,
        pom_filename,
    }
}

fn passthrough(original_filename: &str) -> ResolvedFilenames {
    ResolvedFilenames {
        jar_filename: original_filename.to_string(),
        pom_filename: pom_name_for(original_filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()
    }

    fn names(jar: &str, pom: &str) -> ResolvedFilenames {
        ResolvedFilenames {
            jar_filename: jar.to_string(),
            pom_filename: pom.to_string(),
        }
    }

    #[test]
    fn snapshot_with_custom_timestamp() {
        let resolved = resolve_filenames(
            "lib-2.0-SNAPSHOT.jar",
            "2.0-SNAPSHOT",
            "lib",
            Some("20240101.120000-3"),
            fixed_now(),
        );
        assert_eq!(
            resolved,
            names("lib-2.0-20240101.120000-3.jar", "lib-2.0-20240101.120000-3.pom")
        );
    }

    #[test]
    fn custom_timestamp_is_trimmed() {
        let resolved = resolve_filenames(
            "whatever.jar",
            "2.0-SNAPSHOT",
            "lib",
            Some("  20240101.120000-3\n"),
            fixed_now(),
        );
        assert_eq!(resolved.jar_filename, "lib-2.0-20240101.120000-3.jar");
    }

    #[test]
    fn snapshot_without_timestamp_uses_clock_and_build_one() {
        for timestamp in [None, Some(""), Some("   ")] {
            let resolved = resolve_filenames(
                "lib-2.0-SNAPSHOT.jar",
                "2.0-SNAPSHOT",
                "lib",
                timestamp,
                fixed_now(),
            );
            assert_eq!(
                resolved,
                names("lib-2.0-20240305.070809-1.jar", "lib-2.0-20240305.070809-1.pom")
            );
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve_filenames("x.jar", "1-SNAPSHOT", "x", None, fixed_now());
        let b = resolve_filenames("x.jar", "1-SNAPSHOT", "x", None, fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn release_versions_keep_their_name() {
        let resolved = resolve_filenames(
            "widget-1.0.0.jar",
            "1.0.0",
            "widget",
            Some("20240101.120000-3"),
            fixed_now(),
        );
        assert_eq!(resolved, names("widget-1.0.0.jar", "widget-1.0.0.pom"));
    }

    #[test]
    fn snapshot_marker_must_be_a_suffix() {
        let resolved = resolve_filenames(
            "odd-1.0-SNAPSHOT-patch.jar",
            "1.0-SNAPSHOT-patch",
            "odd",
            None,
            fixed_now(),
        );
        assert_eq!(
            resolved,
            names("odd-1.0-SNAPSHOT-patch.jar", "odd-1.0-SNAPSHOT-patch.pom")
        );
    }

    #[test]
    fn already_timestamped_snapshots_pass_through() {
        let resolved = resolve_filenames(
            "lib-2.0-20240101.120000-2.jar",
            "2.0-SNAPSHOT",
            "lib",
            Some("20250101.000000-9"),
            fixed_now(),
        );
        assert_eq!(
            resolved,
            names("lib-2.0-20240101.120000-2.jar", "lib-2.0-20240101.120000-2.pom")
        );
    }

    #[test]
    fn detects_timestamp_pattern() {
        assert!(is_timestamped_snapshot("lib-2.0-20240101.120000-2.jar"));
        assert!(is_timestamped_snapshot("20240101.120000-15"));
        assert!(!is_timestamped_snapshot("lib-2.0-SNAPSHOT.jar"));
        assert!(!is_timestamped_snapshot("lib-2.0-20240101.1200-2.jar"));
        assert!(!is_timestamped_snapshot("lib-2.0-20240101.120000.jar"));
        // Only ASCII digits form a stamp.
        assert!(!is_timestamped_snapshot("lib-2.0-٢٠٢٤٠١٠١.١٢٠٠٠٠-1.jar"));
    }

    #[test]
    fn pom_name_only_touches_trailing_jar() {
        assert_eq!(pom_name_for("a.jar"), "a.pom");
        assert_eq!(pom_name_for("my.jarvis-1.0.jar"), "my.jarvis-1.0.pom");
        assert_eq!(pom_name_for("plugin.hpi"), "plugin.hpi.pom");
    }

    #[test]
    fn non_jar_upload_never_shares_a_name_with_its_pom() {
        let resolved = resolve_filenames("plugin-1.0.hpi", "1.0", "plugin", None, fixed_now());
        assert_eq!(resolved, names("plugin-1.0.hpi", "plugin-1.0.hpi.pom"));
        assert_ne!(resolved.jar_filename, resolved.pom_filename);
    }

    #[test]
    fn snapshot_timestamp_format() {
        assert_eq!(snapshot_timestamp(fixed_now()), "20240305.070809-1");
    }
}
