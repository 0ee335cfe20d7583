use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::Command;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use fldist_sdk::env::expand_environment;
use fldist_sdk::{BuildRequest, BuildTarget, EnvMap, ReleaseField, builders, codegen, gitref, manifest, package};

const DATE_DIR_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const TIME_DIR_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour][minute][second]");
const BUILD_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// CLI orchestrator for building, packaging, and archiving Flutter release
/// artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "fldist",
    author,
    version,
    about = "Flutter release build and distribution orchestrator",
    long_about = None
)]
struct Cli {
    /// Flutter project directory (defaults to the current directory)
    #[arg(long)]
    project: Option<PathBuf>,
    /// Alias for --project, kept for script compatibility
    #[arg(long)]
    path: Option<PathBuf>,
    /// Environment identifier to build for (e.g. dev, staging, prod)
    #[arg(long)]
    env: String,
    /// Output path for the injected env constants file
    #[arg(long, default_value = "lib/constants/env.dart")]
    env_path: PathBuf,
    /// Output path for the generated release constants file
    #[arg(long, default_value = "lib/constants/release.dart")]
    release_config_path: PathBuf,
    /// Mark this as a sealed (restricted) build
    #[arg(long)]
    sealed: bool,
    /// Target package to build; repeat for multiple targets
    #[arg(long = "dist", value_enum)]
    dist: Vec<TargetArg>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
#[clap(rename_all = "lowercase")]
enum TargetArg {
    Apk,
    Appbundle,
    Ipa,
}

impl From<TargetArg> for BuildTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Apk => BuildTarget::Apk,
            TargetArg::Appbundle => BuildTarget::Appbundle,
            TargetArg::Ipa => BuildTarget::Ipa,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let request = resolve_request(cli)?;
    run(&request)
}

fn resolve_request(cli: Cli) -> Result<BuildRequest> {
    let project_root = match cli.project.or(cli.path) {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving project root from current directory")?,
    };

    // Request order is build order; duplicates collapse.
    let mut targets: Vec<BuildTarget> = Vec::new();
    for arg in cli.dist {
        let target = BuildTarget::from(arg);
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    let request = BuildRequest {
        project_root,
        env: cli.env,
        env_path: cli.env_path,
        release_config_path: cli.release_config_path,
        sealed: cli.sealed,
        targets,
    };
    request.validate()?;
    Ok(request)
}

fn run(request: &BuildRequest) -> Result<()> {
    load_dotenv(&request.project_root);
    let env_vars: EnvMap = std::env::vars().collect();
    let env_vars = expand_environment(&env_vars);

    println!("Installing dependencies...");
    builders::install_dependencies(&request.project_root, &env_vars)?;

    println!(
        "Injecting '{}' environment into {:?}",
        request.env, request.env_path
    );
    builders::inject_environment(&request.project_root, &request.env, &request.env_path, &env_vars)?;

    let metadata = manifest::read_project_metadata(&request.project_root)?;
    let version_code = metadata.version_code_number()?;
    println!(
        "Building {} {}+{} for '{}'",
        metadata.app_name, metadata.version_name, metadata.version_code, request.env
    );

    let commit_ref = gitref::resolve_commit_ref(&request.project_root);
    match &commit_ref {
        Some(commit_ref) => println!("Commit ref: {}", commit_ref),
        None => println!("Commit ref not resolved; continuing without it"),
    }

    let stamp = OffsetDateTime::now_utc();
    let dist_root = create_dist_root(&request.project_root, stamp)?;
    let prefix = package::artifact_prefix(
        request.sealed,
        &request.env,
        &metadata.app_name,
        &metadata.version_name,
        &metadata.version_code,
        stamp,
        commit_ref.as_deref(),
    )?;
    let fields = release_fields(request, &metadata, version_code, stamp, commit_ref.as_deref())?;

    let mut produced = Vec::new();
    for &target in &request.targets {
        // The constants file must be on disk before the native build
        // compiles the app, so it is regenerated at the top of each
        // target iteration.
        codegen::write_release_class(
            &request.project_root.join(&request.release_config_path),
            &fields,
            codegen::DEFAULT_CLASS_NAME,
        )?;

        let artifact = builders::build_artifact(&request.project_root, target, &env_vars)?;
        println!("Built {} at {:?}", target, artifact);

        let out_dir = dist_root.join(target.as_str());
        let artifact_metadata = package::package_artifact(
            &artifact,
            target,
            &out_dir,
            &request.project_root,
            &prefix,
            &metadata.version_name,
            version_code,
        )?;
        println!(
            "Packaged {} ({} bytes, sha256 {})",
            artifact_metadata.filename, artifact_metadata.file_size, artifact_metadata.sha256
        );
        produced.push(out_dir);
    }

    if produced.len() == 1 {
        open_folder(&produced[0]);
    } else {
        open_folder(&dist_root);
    }

    println!("\nDone. Outputs:");
    for dir in &produced {
        println!("  {:?}", dir);
    }
    Ok(())
}

/// Fields recorded in the generated release constants. Identical for every
/// target within one invocation; commitRef is present only when resolved.
fn release_fields(
    request: &BuildRequest,
    metadata: &fldist_sdk::ProjectMetadata,
    version_code: i64,
    stamp: OffsetDateTime,
    commit_ref: Option<&str>,
) -> Result<Vec<ReleaseField>> {
    let build_time = stamp
        .format(&BUILD_TIME_FORMAT)
        .context("formatting build time")?;
    let mut fields = vec![
        ReleaseField::string("appName", metadata.app_name.clone()),
        ReleaseField::string("versionName", metadata.version_name.clone()),
        ReleaseField::int("versionCode", version_code),
        ReleaseField::string("env", request.env.clone()),
        ReleaseField::bool("sealed", request.sealed),
        ReleaseField::string("buildTime", build_time),
    ];
    if let Some(commit_ref) = commit_ref {
        fields.push(ReleaseField::string("commitRef", commit_ref));
    }
    Ok(fields)
}

/// Creates the dated output root `dist/<date>/<time>/` for this invocation.
/// The timestamp key keeps repeated runs from reusing each other's folders.
fn create_dist_root(project_root: &Path, stamp: OffsetDateTime) -> Result<PathBuf> {
    let date = stamp
        .format(&DATE_DIR_FORMAT)
        .context("formatting output date")?;
    let time = stamp
        .format(&TIME_DIR_FORMAT)
        .context("formatting output time")?;
    let root = project_root.join("dist").join(date).join(time);
    std::fs::create_dir_all(&root)
        .with_context(|| format!("creating output root {:?}", root))?;
    Ok(root)
}

/// Opens the given folder in the OS file browser. Best-effort: a missing
/// opener or a non-zero exit never fails the run.
fn open_folder(path: &Path) {
    let program = match std::env::consts::OS {
        "macos" => "open",
        "windows" => "explorer",
        _ => "xdg-open",
    };
    if let Err(e) = Command::new(program).arg(path).status() {
        println!("Could not open {:?} in the file browser: {}", path, e);
    }
}

fn load_dotenv(project_root: &Path) {
    let _ = dotenvy::from_path(project_root.join(".env.local"));
}
