//! Android build automation.
//!
//! Runs the Flutter release build for the APK or app bundle target and
//! locates the artifact at the toolchain's well-known output path.

use std::path::PathBuf;

use crate::builders::{flutter_command, run_tool};
use crate::types::{BuildTarget, DistError, EnvMap};

/// Builds Android release artifacts for a Flutter project.
pub struct AndroidBuilder {
    project_root: PathBuf,
}

impl AndroidBuilder {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Runs `flutter build <target> --release` and returns the artifact path.
    pub fn build(&self, target: BuildTarget, env: &EnvMap) -> Result<PathBuf, DistError> {
        let (subcommand, artifact_rel) = match target {
            BuildTarget::Apk => ("apk", "build/app/outputs/flutter-apk/app-release.apk"),
            BuildTarget::Appbundle => ("appbundle", "build/app/outputs/bundle/release/app-release.aab"),
            BuildTarget::Ipa => {
                return Err(DistError::Build(
                    "ipa is not an Android target".to_string(),
                ));
            }
        };

        println!("Building Android {} in release mode...", target);
        run_tool(
            flutter_command(),
            &["build", subcommand, "--release"],
            &self.project_root,
            env,
            &format!("flutter build {}", subcommand),
        )?;

        let artifact = self.project_root.join(artifact_rel);
        if !artifact.is_file() {
            return Err(DistError::MissingArtifact(artifact));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipa_is_rejected_by_the_android_builder() {
        let builder = AndroidBuilder::new("/tmp/project");
        let err = builder.build(BuildTarget::Ipa, &EnvMap::new()).unwrap_err();
        assert!(err.to_string().contains("not an Android target"));
    }
}
