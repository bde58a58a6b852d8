use anyhow::{Context, Result};
use pyzap_core::Environment;
use std::fs;
use std::path::PathBuf;

use crate::StagingLayout;

pub fn write_environment(layout: &StagingLayout, environment: &Environment) -> Result<PathBuf> {
    let path = layout.environment_path();
    fs::write(&path, environment.to_json()?)
        .with_context(|| format!("failed to write environment metadata: {}", path.display()))?;
    Ok(path)
}
