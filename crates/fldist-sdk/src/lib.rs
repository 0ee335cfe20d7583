//! Release distribution SDK for Flutter projects.
//!
//! `fldist-sdk` automates the repetitive tail of a mobile release: it runs
//! the platform build toolchain, regenerates the release constants file,
//! checksums the produced artifact, and archives everything into a dated
//! output folder.
//!
//! # Components
//!
//! - **Builders**: per-target invocation of `flutter build` and artifact
//!   location ([`builders`])
//! - **Codegen**: deterministic generation of the Dart release constants
//!   class ([`codegen`])
//! - **Packaging**: checksums, metadata sidecars, and zip archives
//!   ([`package`])
//! - **Manifest**: `pubspec.yaml` name/version derivation ([`manifest`])
//! - **Environment**: `%VAR%` expansion of the Windows environment
//!   snapshot ([`env`])
//! - **Gitref**: best-effort short commit hash resolution ([`gitref`])
//!
//! # Example
//!
//! ```ignore
//! use fldist_sdk::{builders, package, BuildTarget};
//!
//! let artifact = builders::build_artifact(&root, BuildTarget::Apk, &env)?;
//! package::package_artifact(&artifact, BuildTarget::Apk, &out_dir, &root,
//!                           &prefix, "1.0.0", 1)?;
//! ```

pub mod builders;
pub mod codegen;
pub mod env;
pub mod gitref;
pub mod manifest;
pub mod package;
pub mod types;

// Re-export key types for convenience
pub use codegen::{FieldValue, ReleaseField};
pub use package::ArtifactMetadata;
pub use types::{BuildRequest, BuildTarget, DistError, EnvMap, ProjectMetadata};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
