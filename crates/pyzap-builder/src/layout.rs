use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SITE_PACKAGES_DIR: &str = "site-packages";
pub const BOOTSTRAP_DIR: &str = "_bootstrap";
pub const ENVIRONMENT_FILE: &str = "environment.json";

/// Relative layout of a staging area; the same paths are used inside the
/// finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    root: PathBuf,
}

impl StagingLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site_packages_dir(&self) -> PathBuf {
        self.root.join(SITE_PACKAGES_DIR)
    }

    pub fn bootstrap_dir(&self) -> PathBuf {
        self.root.join(BOOTSTRAP_DIR)
    }

    pub fn environment_path(&self) -> PathBuf {
        self.root.join(ENVIRONMENT_FILE)
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.site_packages_dir(), self.bootstrap_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
