//! iOS build automation.
//!
//! Runs the Flutter release IPA build. The artifact name comes from the
//! `CFBundleName` entry of the runner's `Info.plist`, so that file is
//! pattern-matched before the output path is checked.

use std::path::PathBuf;

use crate::builders::{flutter_command, run_tool};
use crate::types::{DistError, EnvMap};

/// Builds the iOS release IPA for a Flutter project.
pub struct IosBuilder {
    project_root: PathBuf,
}

impl IosBuilder {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Runs `flutter build ipa --release` and returns the artifact path.
    pub fn build(&self, env: &EnvMap) -> Result<PathBuf, DistError> {
        println!("Building iOS ipa in release mode...");
        run_tool(
            flutter_command(),
            &["build", "ipa", "--release"],
            &self.project_root,
            env,
            "flutter build ipa",
        )?;

        let bundle_name = self.read_bundle_name()?;
        let artifact = self
            .project_root
            .join("build/ios/ipa")
            .join(format!("{}.ipa", bundle_name));
        if !artifact.is_file() {
            return Err(DistError::MissingArtifact(artifact));
        }
        Ok(artifact)
    }

    fn read_bundle_name(&self) -> Result<String, DistError> {
        let path = self.project_root.join("ios/Runner/Info.plist");
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DistError::Build(format!("cannot read bundle info {:?}: {}", path, e))
        })?;
        bundle_name(&contents).ok_or_else(|| {
            DistError::Build(format!("CFBundleName not found in {:?}", path))
        })
    }
}

/// Extracts the string value following the `CFBundleName` key.
fn bundle_name(plist: &str) -> Option<String> {
    let key_at = plist.find("<key>CFBundleName</key>")?;
    let rest = &plist[key_at..];
    let start = rest.find("<string>")? + "<string>".len();
    let end = start + rest[start..].find("</string>")?;
    let name = rest[start..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
