use anyhow::{Context, Result};
use pyzap_core::{validate_build_inputs, Environment, UserError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::archive::{create_archive, ArchiveOptions};
use crate::bootstrap::{copy_bootstrap, BOOTSTRAP_MAIN};
use crate::entry_points::{find_entry_point, EntryPointError};
use crate::installer::Installer;
use crate::metadata::write_environment;
use crate::StagingLayout;

/// Interpreter directive used when neither the request nor the installer
/// names one.
pub const DEFAULT_INTERPRETER: &str = "/usr/bin/env python3";

const STAGING_PREFIX: &str = "pyzap-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub output_file: Option<PathBuf>,
    pub installer_args: Vec<String>,
    pub compressed: bool,
    pub interpreter: Option<String>,
    pub entry_point: Option<String>,
    pub console_script: Option<String>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            output_file: None,
            installer_args: Vec::new(),
            compressed: true,
            interpreter: None,
            entry_point: None,
            console_script: None,
        }
    }
}

impl BuildRequest {
    pub fn new(output_file: impl Into<PathBuf>, installer_args: Vec<String>) -> Self {
        Self {
            output_file: Some(output_file.into()),
            installer_args,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub output_file: PathBuf,
    pub build_id: String,
    pub entry_point: Option<String>,
    pub entries: usize,
    pub sha256: String,
}

/// Builds one executable archive, staging under the system temp directory.
pub fn build(request: &BuildRequest, installer: &dyn Installer) -> Result<BuildOutcome> {
    build_in(&std::env::temp_dir(), request, installer)
}

/// Builds one executable archive, staging in a fresh directory below
/// `staging_parent`.
///
/// Input validation runs before anything touches the filesystem. The staging
/// directory is removed on every exit path and the output file is only
/// replaced once every step has succeeded. Once the archive is in place the
/// build has succeeded, even if staging cannot be removed.
pub fn build_in(
    staging_parent: &Path,
    request: &BuildRequest,
    installer: &dyn Installer,
) -> Result<BuildOutcome> {
    let output_file =
        validate_build_inputs(request.output_file.as_deref(), &request.installer_args)?;

    let working = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(staging_parent)
        .with_context(|| {
            format!(
                "failed to create staging directory in {}",
                staging_parent.display()
            )
        })?;
    let layout = StagingLayout::new(working.path());
    layout.ensure_base_dirs()?;
    debug!(staging = %layout.root().display(), "created staging area");

    let site_packages = layout.site_packages_dir();
    let mut installer_args = vec!["--target".to_string(), site_packages.display().to_string()];
    installer_args.extend(request.installer_args.iter().cloned());
    installer.install(&installer_args)?;
    info!(target = %site_packages.display(), "installed packages");

    let entry_point = match (&request.entry_point, &request.console_script) {
        (Some(entry_point), _) => Some(entry_point.clone()),
        (None, Some(console_script)) => {
            Some(resolve_console_script(&site_packages, console_script)?)
        }
        (None, None) => None,
    };

    let environment = Environment::new(Uuid::new_v4().to_string(), entry_point);
    write_environment(&layout, &environment)?;
    info!(
        build_id = %environment.build_id,
        entry_point = ?environment.entry_point,
        "wrote environment"
    );

    copy_bootstrap(&layout.bootstrap_dir())?;

    let interpreter = request
        .interpreter
        .clone()
        .or_else(|| installer.interpreter().map(|path| path.display().to_string()))
        .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());
    let summary = create_archive(
        layout.root(),
        &ArchiveOptions {
            target: output_file.to_path_buf(),
            interpreter: Some(interpreter),
            main: BOOTSTRAP_MAIN.to_string(),
            compressed: request.compressed,
        },
    )?;
    info!(output = %summary.path.display(), entries = summary.entries, "built archive");

    discard_staging(working);

    Ok(BuildOutcome {
        output_file: summary.path,
        build_id: environment.build_id,
        entry_point: environment.entry_point,
        entries: summary.entries,
        sha256: summary.sha256,
    })
}

/// Removes the staging directory after a successful build. A leftover
/// directory is logged and never turns the build into a failure.
pub(crate) fn discard_staging(working: TempDir) {
    let path = working.path().to_path_buf();
    if let Err(err) = working.close() {
        warn!(staging = %path.display(), error = %err, "failed to remove staging directory");
    }
}

fn resolve_console_script(site_packages: &Path, console_script: &str) -> Result<String> {
    match find_entry_point(site_packages, console_script) {
        Ok(entry_point) => {
            debug!(console_script, entry_point = %entry_point, "resolved console script");
            Ok(entry_point)
        }
        Err(EntryPointError::NotFound { console_script }) => {
            Err(UserError::NoEntryPoint { console_script }.into())
        }
        Err(err) => Err(err).context("failed to resolve console script"),
    }
}
