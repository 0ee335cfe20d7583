//! Project manifest reading.
//!
//! Reads `pubspec.yaml` and derives the version name and version code from
//! the `<versionName>[+<versionCode>]` version syntax.

use std::path::Path;

use serde::Deserialize;

use crate::types::{DistError, ProjectMetadata};

#[derive(Debug, Deserialize)]
struct Pubspec {
    name: String,
    version: Option<String>,
}

/// Reads `pubspec.yaml` from the project root.
///
/// A version without a `+` part defaults the version code to `"1"` with a
/// printed notice; a missing `version` key is a configuration error.
pub fn read_project_metadata(project_root: &Path) -> Result<ProjectMetadata, DistError> {
    let path = project_root.join("pubspec.yaml");
    let contents = std::fs::read_to_string(&path).map_err(|e| {
        DistError::Config(format!("cannot read project manifest {:?}: {}", path, e))
    })?;
    let pubspec: Pubspec = serde_yaml::from_str(&contents)?;
    let version = pubspec.version.ok_or_else(|| {
        DistError::Config(format!("pubspec.yaml at {:?} has no 'version' key", path))
    })?;

    let (version_name, version_code) = split_version(&version);
    if version_code.is_none() {
        println!(
            "Note: version '{}' has no '+<code>' part; defaulting version code to 1",
            version
        );
    }

    Ok(ProjectMetadata {
        app_name: pubspec.name,
        version_name,
        version_code: version_code.unwrap_or_else(|| "1".to_string()),
    })
}

/// Splits a manifest version on the first `+`.
fn split_version(version: &str) -> (String, Option<String>) {
    match version.split_once('+') {
        Some((name, code)) => (name.to_string(), Some(code.to_string())),
        None => (version.to_string(), None),
    }
}
