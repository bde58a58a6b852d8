use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Run-time metadata read by the bootstrap loader inside a built archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Environment {
    pub build_id: String,
    pub entry_point: Option<String>,
}

impl Environment {
    pub fn new(build_id: impl Into<String>, entry_point: Option<String>) -> Self {
        Self {
            build_id: build_id.into(),
            entry_point,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let mut rendered =
            serde_json::to_string_pretty(self).context("failed to serialize environment")?;
        rendered.push('\n');
        Ok(rendered)
    }

    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        serde_json::from_str(input).context("failed to parse environment metadata")
    }
}
