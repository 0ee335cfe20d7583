//! Core types for fldist-sdk.
//!
//! This module defines the fundamental types used throughout the SDK:
//!
//! - [`DistError`] - Error types for build and packaging operations
//! - [`BuildTarget`] - Requested output package (APK, AAB, or IPA)
//! - [`BuildRequest`] - Inputs resolved once per invocation
//! - [`ProjectMetadata`] - Name and version read from `pubspec.yaml`

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment snapshot handed to every spawned toolchain command.
///
/// Built once per invocation from the process environment (after `%VAR%`
/// expansion on Windows) and never mutated afterward.
pub type EnvMap = BTreeMap<String, String>;

/// Error types for fldist-sdk operations.
#[derive(Debug, thiserror::Error)]
pub enum DistError {
    /// Invalid or missing configuration. Raised before any external
    /// command runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// A platform toolchain command failed or could not be spawned.
    #[error("build error: {0}")]
    Build(String),

    /// The build command succeeded but the expected artifact is absent.
    #[error("expected artifact not found at {0:?}")]
    MissingArtifact(PathBuf),

    /// An I/O error occurred. Common causes are missing files, permission
    /// issues, or disk space problems while packaging.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `pubspec.yaml` could not be parsed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),

    /// The metadata sidecar could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Creating the output zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Formatting the build timestamp failed.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// One requested output package type.
///
/// Each variant carries its output extension and the platform source
/// directory it requires; dispatch is an exhaustive `match` so adding a
/// target forces every site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildTarget {
    /// Android application package.
    Apk,
    /// Android app bundle (Play Store upload format).
    Appbundle,
    /// iOS application archive.
    Ipa,
}

impl BuildTarget {
    /// Name used on the CLI and for the per-target output folder.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTarget::Apk => "apk",
            BuildTarget::Appbundle => "appbundle",
            BuildTarget::Ipa => "ipa",
        }
    }

    /// File extension of the produced artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            BuildTarget::Apk => "apk",
            BuildTarget::Appbundle => "aab",
            BuildTarget::Ipa => "ipa",
        }
    }

    /// Platform source directory that must exist in the project.
    pub fn platform_dir(&self) -> &'static str {
        match self {
            BuildTarget::Apk | BuildTarget::Appbundle => "android",
            BuildTarget::Ipa => "ios",
        }
    }
}

impl std::fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs resolved once per invocation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Root directory of the Flutter project.
    pub project_root: PathBuf,
    /// Environment identifier (e.g. "dev", "prod").
    pub env: String,
    /// Output path for the injected env constants file, relative to the
    /// project root.
    pub env_path: PathBuf,
    /// Output path for the generated release constants file, relative to
    /// the project root.
    pub release_config_path: PathBuf,
    /// Marks a restricted build; recorded in generated constants and the
    /// artifact name.
    pub sealed: bool,
    /// Requested targets in request order, duplicates collapsed.
    pub targets: Vec<BuildTarget>,
}

impl BuildRequest {
    /// Validates the request before any external command runs.
    ///
    /// Checks that the environment identifier is non-empty, at least one
    /// target is requested, and every required platform directory exists.
    /// A late per-target check would leave earlier targets' artifacts
    /// orphaned mid-pipeline, so all targets are checked up front.
    pub fn validate(&self) -> Result<(), DistError> {
        if self.env.trim().is_empty() {
            return Err(DistError::Config(
                "environment identifier must not be empty".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(DistError::Config(
                "no targets selected; pass at least one --dist".to_string(),
            ));
        }
        for target in &self.targets {
            let platform_dir = self.project_root.join(target.platform_dir());
            if !platform_dir.is_dir() {
                return Err(DistError::Config(format!(
                    "target '{}' requires the {:?} directory, which does not exist",
                    target, platform_dir
                )));
            }
        }
        Ok(())
    }
}

/// Name and version read from the project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Application name (`name` key in `pubspec.yaml`).
    pub app_name: String,
    /// Part of `version` before the first `+`.
    pub version_name: String,
    /// Part of `version` after the first `+`, or `"1"` if absent.
    pub version_code: String,
}

impl ProjectMetadata {
    /// Parses the version code as an integer for the metadata sidecar and
    /// generated constants.
    pub fn version_code_number(&self) -> Result<i64, DistError> {
        self.version_code.parse().map_err(|_| {
            DistError::Config(format!(
                "version code '{}' in pubspec.yaml is not an integer",
                self.version_code
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_attributes_are_consistent() {
        assert_eq!(BuildTarget::Apk.extension(), "apk");
        assert_eq!(BuildTarget::Appbundle.extension(), "aab");
        assert_eq!(BuildTarget::Ipa.extension(), "ipa");
        assert_eq!(BuildTarget::Appbundle.platform_dir(), "android");
        assert_eq!(BuildTarget::Ipa.platform_dir(), "ios");
    }

    #[test]
    fn empty_targets_are_rejected() {
        let request = BuildRequest {
            project_root: PathBuf::from("."),
            env: "dev".to_string(),
            env_path: PathBuf::from("lib/constants/env.dart"),
            release_config_path: PathBuf::from("lib/constants/release.dart"),
            sealed: false,
            targets: vec![],
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("no targets selected"));
    }

    #[test]
    fn empty_env_is_rejected() {
        let request = BuildRequest {
            project_root: PathBuf::from("."),
            env: "  ".to_string(),
            env_path: PathBuf::from("lib/constants/env.dart"),
            release_config_path: PathBuf::from("lib/constants/release.dart"),
            sealed: false,
            targets: vec![BuildTarget::Apk],
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("environment identifier"));
    }

    #[test]
    fn missing_platform_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("android")).unwrap();
        let request = BuildRequest {
            project_root: dir.path().to_path_buf(),
            env: "dev".to_string(),
            env_path: PathBuf::from("lib/constants/env.dart"),
            release_config_path: PathBuf::from("lib/constants/release.dart"),
            sealed: false,
            targets: vec![BuildTarget::Apk, BuildTarget::Ipa],
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("'ipa'"));
    }

    #[test]
    fn version_code_must_be_numeric() {
        let metadata = ProjectMetadata {
            app_name: "app".to_string(),
            version_name: "1.0.0".to_string(),
            version_code: "beta".to_string(),
        };
        assert!(metadata.version_code_number().is_err());

        let metadata = ProjectMetadata {
            version_code: "42".to_string(),
            ..metadata
        };
        assert_eq!(metadata.version_code_number().unwrap(), 42);
    }
}
