//! Artifact post-processing.
//!
//! After a target's native build completes, the artifact is copied into the
//! target's output folder under its distribution name, described by a JSON
//! metadata sidecar, bundled with the dependency lockfile, and finally
//! zipped for hand-off.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::types::{BuildTarget, DistError};

/// Build timestamp as it appears in artifact names.
const STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

/// Metadata describing one packaged artifact. Written once as the
/// `<prefix>.json` sidecar and never mutated afterward.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub version_name: String,
    pub version_code: i64,
    pub filename: String,
    pub file_size: u64,
    pub sha256: String,
}

/// Builds the shared filename prefix for one target's outputs.
///
/// Parts joined with `_`, in order: `SEALED` (sealed builds only), env
/// identifier, app name, `<versionName>+<versionCode>`, build timestamp,
/// commit ref (only when resolved). Sortable and self-describing.
pub fn artifact_prefix(
    sealed: bool,
    env: &str,
    app_name: &str,
    version_name: &str,
    version_code: &str,
    stamp: OffsetDateTime,
    commit_ref: Option<&str>,
) -> Result<String, DistError> {
    let mut parts = Vec::with_capacity(6);
    if sealed {
        parts.push("SEALED".to_string());
    }
    parts.push(env.to_string());
    parts.push(app_name.to_string());
    parts.push(format!("{}+{}", version_name, version_code));
    parts.push(stamp.format(&STAMP_FORMAT)?);
    if let Some(commit_ref) = commit_ref {
        parts.push(commit_ref.to_string());
    }
    Ok(parts.join("_"))
}

/// Packages a built artifact into `out_dir`.
///
/// Copies the artifact under its distribution name, writes the metadata
/// sidecar, copies `pubspec.lock` from the project root (required for
/// reproducible rebuilds, so a missing lockfile is fatal), and zips the
/// folder. Returns the sidecar metadata.
pub fn package_artifact(
    artifact: &Path,
    target: BuildTarget,
    out_dir: &Path,
    project_root: &Path,
    prefix: &str,
    version_name: &str,
    version_code: i64,
) -> Result<ArtifactMetadata, DistError> {
    fs::create_dir_all(out_dir)?;

    let filename = format!("{}.{}", prefix, target.extension());
    let staged = out_dir.join(&filename);
    fs::copy(artifact, &staged)?;

    let file_size = fs::metadata(&staged)?.len();
    let sha256 = sha256_file(&staged)?;
    let metadata = ArtifactMetadata {
        version_name: version_name.to_string(),
        version_code,
        filename,
        file_size,
        sha256,
    };

    let sidecar = out_dir.join(format!("{}.json", prefix));
    fs::write(&sidecar, serde_json::to_string_pretty(&metadata)?)?;

    let lockfile = project_root.join("pubspec.lock");
    if !lockfile.is_file() {
        return Err(DistError::Build(format!(
            "dependency lockfile not found at {:?}; it is required for reproducible rebuilds",
            lockfile
        )));
    }
    fs::copy(&lockfile, out_dir.join("pubspec.lock"))?;

    let archive_name = format!("{}.{}.zip", prefix, target.extension());
    zip_directory(out_dir, &archive_name)?;

    Ok(metadata)
}

/// Streams a file through SHA-256 and returns the hex digest. The artifact
/// is never read fully into memory.
fn sha256_file(path: &Path) -> Result<String, DistError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Zips every file in `dir` into `dir/<archive_name>`.
///
/// The archive file is created before the directory listing is taken, so
/// it shows up in its own listing; it is excluded by name match rather
/// than by any creation-order assumption.
fn zip_directory(dir: &Path, archive_name: &str) -> Result<PathBuf, DistError> {
    let archive_path = dir.join(archive_name);
    let mut writer = zip::ZipWriter::new(File::create(&archive_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == archive_name {
            continue;
        }
        writer.start_file(name, options)?;
        let mut source = File::open(&path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use zip::ZipArchive;

    #[test]
    fn prefix_joins_all_parts_in_order() {
        let prefix = artifact_prefix(
            true,
            "prod",
            "App",
            "1.0",
            "2",
            datetime!(2024-01-01 10:00:00 UTC),
            Some("abcd12"),
        )
        .unwrap();
        assert_eq!(prefix, "SEALED_prod_App_1.0+2_20240101100000_abcd12");
    }

    #[test]
    fn prefix_omits_optional_parts() {
        let prefix = artifact_prefix(
            false,
            "dev",
            "App",
            "1.0",
            "1",
            datetime!(2024-01-01 10:00:00 UTC),
            None,
        )
        .unwrap();
        assert_eq!(prefix, "dev_App_1.0+1_20240101100000");
    }

    #[test]
    fn hashes_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn archive_never_contains_itself() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        fs::write(dir.path().join("b.txt"), "two").unwrap();

        let archive = zip_directory(dir.path(), "out.apk.zip").unwrap();
        let mut reader = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<String> = (0..reader.len())
            .map(|i| reader.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.txt".to_string()));
        assert!(names.contains(&"b.txt".to_string()));
        assert!(!names.iter().any(|n| n == "out.apk.zip"));
    }

    #[test]
    fn packages_artifact_with_sidecar_and_lockfile() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join("pubspec.lock"), "packages: {}\n").unwrap();
        let artifact = project.path().join("app-release.apk");
        fs::write(&artifact, b"binary payload").unwrap();

        let out_dir = project.path().join("dist/2024-01-01/100000/apk");
        let metadata = package_artifact(
            &artifact,
            BuildTarget::Apk,
            &out_dir,
            project.path(),
            "dev_App_1.0+1_20240101100000",
            "1.0",
            1,
        )
        .unwrap();

        assert_eq!(metadata.filename, "dev_App_1.0+1_20240101100000.apk");
        assert_eq!(metadata.file_size, 14);
        assert!(out_dir.join("dev_App_1.0+1_20240101100000.apk").is_file());
        assert!(out_dir.join("pubspec.lock").is_file());
        assert!(out_dir.join("dev_App_1.0+1_20240101100000.apk.zip").is_file());

        let sidecar =
            fs::read_to_string(out_dir.join("dev_App_1.0+1_20240101100000.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
        assert_eq!(value["versionName"], "1.0");
        assert_eq!(value["versionCode"], 1);
        assert_eq!(value["fileSize"], 14);
        assert_eq!(value["sha256"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn missing_lockfile_is_fatal() {
        let project = tempfile::tempdir().unwrap();
        let artifact = project.path().join("app-release.apk");
        fs::write(&artifact, b"payload").unwrap();

        let err = package_artifact(
            &artifact,
            BuildTarget::Apk,
            &project.path().join("out"),
            project.path(),
            "dev_App_1.0+1_20240101100000",
            "1.0",
            1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("lockfile"));
    }
}
