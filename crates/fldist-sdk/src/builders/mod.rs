//! Platform build automation.
//!
//! Builders invoke the Flutter toolchain for one target each and locate
//! the artifact it produced. Toolchain output is streamed to the console;
//! a non-zero exit or a missing artifact aborts the run.

pub mod android;
pub mod ios;

pub use android::AndroidBuilder;
pub use ios::IosBuilder;

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::types::{BuildTarget, DistError, EnvMap};

/// Builds one target and returns the path of the produced artifact.
pub fn build_artifact(
    project_root: &Path,
    target: BuildTarget,
    env: &EnvMap,
) -> Result<PathBuf, DistError> {
    match target {
        BuildTarget::Apk | BuildTarget::Appbundle => {
            AndroidBuilder::new(project_root).build(target, env)
        }
        BuildTarget::Ipa => IosBuilder::new(project_root).build(env),
    }
}

/// Fetches project dependencies with `flutter pub get`.
pub fn install_dependencies(project_root: &Path, env: &EnvMap) -> Result<(), DistError> {
    run_tool(
        flutter_command(),
        &["pub", "get"],
        project_root,
        env,
        "flutter pub get",
    )
}

/// Runs the project's env-injection tool, which writes the env constants
/// file for the given environment identifier. Contract is exit code only.
pub fn inject_environment(
    project_root: &Path,
    env_id: &str,
    env_path: &Path,
    env: &EnvMap,
) -> Result<(), DistError> {
    let out = env_path.to_string_lossy();
    run_tool(
        dart_command(),
        &["run", "tool/gen_env.dart", "--env", env_id, "--out", out.as_ref()],
        project_root,
        env,
        "env injection",
    )
}

pub(crate) fn flutter_command() -> &'static str {
    if cfg!(windows) { "flutter.bat" } else { "flutter" }
}

pub(crate) fn dart_command() -> &'static str {
    if cfg!(windows) { "dart.bat" } else { "dart" }
}

/// Runs a toolchain command with inherited stdio and the expanded
/// environment snapshot, waiting for it to exit.
pub(crate) fn run_tool(
    program: &str,
    args: &[&str],
    project_root: &Path,
    env: &EnvMap,
    description: &str,
) -> Result<(), DistError> {
    let status = Command::new(program)
        .args(args)
        .current_dir(project_root)
        .envs(env)
        .status()
        .map_err(|e| DistError::Build(format!("failed to run {}: {}", description, e)))?;
    if !status.success() {
        return Err(DistError::Build(format!(
            "{} failed with {}",
            description, status
        )));
    }
    Ok(())
}
