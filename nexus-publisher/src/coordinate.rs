//! Resolving Maven coordinates from descriptor text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{self, DescriptorNode};
use crate::{AppError, AppResult};

/// The `groupId:artifactId:version` triple identifying an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    /// Parse pom.xml text and resolve its coordinate.
    ///
    /// `groupId` and `version` fall back to the `<parent>` block when the
    /// project does not declare them; `artifactId` has no fallback.
    pub fn from_descriptor(xml: &str) -> AppResult<Self> {
        let root = descriptor::parse(xml)?;
        Self::from_project(&root)
    }

    /// Resolve the coordinate of an already parsed `<project>` element.
    pub fn from_project(project: &DescriptorNode) -> AppResult<Self> {
        if project.name != "project" {
            return Err(AppError::MalformedDescriptor(format!(
                "Expected <project> root element, found <{}>",
                project.name
            )));
        }

        let parent = project.child("parent");
        let inherited = |field: &str| parent.and_then(|p| p.child_text(field));

        let group_id = project.child_text("groupId").or_else(|| inherited("groupId"));
        let artifact_id = project.child_text("artifactId");
        let version = project.child_text("version").or_else(|| inherited("version"));

        match (group_id, artifact_id, version) {
            (Some(group_id), Some(artifact_id), Some(version)) => {
                debug!(%group_id, %artifact_id, %version, "Resolved coordinate");
                Ok(Coordinate {
                    group_id: group_id.to_string(),
                    artifact_id: artifact_id.to_string(),
                    version: version.to_string(),
                })
            }
            (group_id, artifact_id, version) => {
                let missing = [
                    ("groupId", group_id.is_none()),
                    ("artifactId", artifact_id.is_none()),
                    ("version", version.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(AppError::IncompleteCoordinate { missing })
            }
        }
    }

    /// `com.acme.tools` → `com/acme/tools`
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_fields(xml: &str) -> Vec<&'static str> {
        match Coordinate::from_descriptor(xml) {
            Err(AppError::IncompleteCoordinate { missing }) => missing,
            other => panic!("expected IncompleteCoordinate, got {other:?}"),
        }
    }

    #[test]
    fn reads_top_level_fields() {
        let coordinate = Coordinate::from_descriptor(
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
                 <groupId>com.acme</groupId>
                 <artifactId>widget</artifactId>
                 <version>1.0.0</version>
               </project>"#,
        )
        .unwrap();

        assert_eq!(
            coordinate,
            Coordinate {
                group_id: "com.acme".into(),
                artifact_id: "widget".into(),
                version: "1.0.0".into(),
            }
        );
        assert_eq!(coordinate.to_string(), "com.acme:widget:1.0.0");
        assert_eq!(coordinate.group_path(), "com/acme");
    }

    #[test]
    fn inherits_group_and_version_from_parent() {
        let coordinate = Coordinate::from_descriptor(
            "<project>
               <parent>
                 <groupId>org.parent</groupId>
                 <artifactId>parent-pom</artifactId>
                 <version>7-SNAPSHOT</version>
               </parent>
               <artifactId>child</artifactId>
             </project>",
        )
        .unwrap();

        assert_eq!(coordinate.group_id, "org.parent");
        assert_eq!(coordinate.artifact_id, "child");
        assert_eq!(coordinate.version, "7-SNAPSHOT");
    }

    #[test]
    fn own_values_win_over_parent() {
        let coordinate = Coordinate::from_descriptor(
            "<project>
               <parent><groupId>org.parent</groupId><version>1</version></parent>
               <groupId>org.child</groupId>
               <artifactId>child</artifactId>
               <version>2</version>
             </project>",
        )
        .unwrap();
        assert_eq!(coordinate.group_id, "org.child");
        assert_eq!(coordinate.version, "2");
    }

    #[test]
    fn empty_elements_fall_back_to_parent() {
        let coordinate = Coordinate::from_descriptor(
            "<project>
               <parent><groupId>org.parent</groupId><version>1</version></parent>
               <groupId/>
               <artifactId>child</artifactId>
               <version>  </version>
             </project>",
        )
        .unwrap();
        assert_eq!(coordinate.group_id, "org.parent");
        assert_eq!(coordinate.version, "1");
    }

    #[test]
    fn artifact_id_never_comes_from_parent() {
        let missing = missing_fields(
            "<project>
               <parent>
                 <groupId>org.parent</groupId>
                 <artifactId>parent-pom</artifactId>
                 <version>1</version>
               </parent>
               <groupId>g</groupId>
               <version>1</version>
             </project>",
        );
        assert_eq!(missing, ["artifactId"]);
    }

    #[test]
    fn reports_every_missing_field() {
        assert_eq!(
            missing_fields("<project><modelVersion>4.0.0</modelVersion></project>"),
            ["groupId", "artifactId", "version"]
        );
        assert_eq!(
            missing_fields("<project><artifactId>a</artifactId><version>1</version></project>"),
            ["groupId"]
        );
    }

    #[test]
    fn non_project_root_is_malformed() {
        let err = Coordinate::from_descriptor("<settings><groupId>g</groupId></settings>")
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedDescriptor(_)));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let coordinate = Coordinate {
            group_id: "g".into(),
            artifact_id: "a".into(),
            version: "1".into(),
        };
        assert_eq!(
            serde_json::to_value(&coordinate).unwrap(),
            serde_json::json!({"groupId": "g", "artifactId": "a", "version": "1"})
        );
    }
}
