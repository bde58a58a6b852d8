mod archive;
mod bootstrap;
mod build;
mod entry_points;
mod fs_utils;
mod installer;
mod layout;
mod metadata;

pub use archive::{create_archive, ArchiveOptions, ArchiveSummary, MAIN_FILE};
pub use bootstrap::{copy_bootstrap, BOOTSTRAP_FILE_NAMES, BOOTSTRAP_MAIN};
pub use build::{build, build_in, BuildOutcome, BuildRequest, DEFAULT_INTERPRETER};
pub use entry_points::{
    collect_entry_points, find_entry_point, EntryPointError, EntryPointFiles, ENTRY_POINTS_FILE,
};
pub use fs_utils::sha256_file;
pub use installer::{resolve_host_python, Installer, InstallerError, PipInstaller, PYTHON_ENV};
pub use layout::{StagingLayout, BOOTSTRAP_DIR, ENVIRONMENT_FILE, SITE_PACKAGES_DIR};
pub use metadata::write_environment;
