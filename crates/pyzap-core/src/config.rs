use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

/// Optional build configuration loaded from a TOML file.
///
/// ```toml
/// [build]
/// output_file = "dist/tool.pyz"
/// console_script = "tool"
/// installer_args = ["tool==1.2.0"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub output_file: Option<PathBuf>,
    pub entry_point: Option<String>,
    pub console_script: Option<String>,
    pub python: Option<String>,
    pub compressed: Option<bool>,
    #[serde(default)]
    pub installer_args: Vec<String>,
}

impl BuildConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse pyzap config")?;
        let build = &config.build;
        if let Some(entry_point) = &build.entry_point {
            if entry_point.trim().is_empty() {
                return Err(anyhow!("build.entry_point must not be empty"));
            }
        }
        if let Some(console_script) = &build.console_script {
            if console_script.trim().is_empty() {
                return Err(anyhow!("build.console_script must not be empty"));
            }
        }
        if let Some(python) = &build.python {
            if python.trim().is_empty() {
                return Err(anyhow!("build.python must not be empty"));
            }
        }
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }
}
