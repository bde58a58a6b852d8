use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Callable the archive's `__main__.py` hands control to.
pub const BOOTSTRAP_MAIN: &str = "_bootstrap:bootstrap";

/// Files the embedded bootstrap set must provide.
pub const BOOTSTRAP_FILE_NAMES: &[&str] = &["__init__.py", "environment.py", "interpreter.py"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BootstrapEntry {
    File {
        name: &'static str,
        contents: &'static str,
    },
    Directory {
        name: &'static str,
    },
}

/// Loader package compiled into this binary. It never changes at runtime.
pub(crate) const EMBEDDED_RESOURCES: &[BootstrapEntry] = &[
    BootstrapEntry::File {
        name: "__init__.py",
        contents: include_str!("../bootstrap/__init__.py"),
    },
    BootstrapEntry::File {
        name: "environment.py",
        contents: include_str!("../bootstrap/environment.py"),
    },
    BootstrapEntry::File {
        name: "interpreter.py",
        contents: include_str!("../bootstrap/interpreter.py"),
    },
    BootstrapEntry::Directory {
        name: "__pycache__",
    },
];

/// Copies the embedded bootstrap files into `target`, returning the
/// written paths.
///
/// Directory markers are skipped. A missing expected file means this binary
/// was built with an incomplete resource table and is reported as an
/// internal error.
pub fn copy_bootstrap(target: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target)
        .with_context(|| format!("failed to create {}", target.display()))?;

    let mut written = Vec::new();
    for entry in EMBEDDED_RESOURCES {
        match entry {
            BootstrapEntry::File { name, contents } => {
                let dst = target.join(name);
                fs::write(&dst, contents)
                    .with_context(|| format!("failed to write {}", dst.display()))?;
                written.push(dst);
            }
            BootstrapEntry::Directory { name } => {
                trace!(name, "skipping bootstrap directory marker");
            }
        }
    }

    let present = written
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .collect::<BTreeSet<_>>();
    let missing = BOOTSTRAP_FILE_NAMES
        .iter()
        .filter(|name| !present.contains(*name))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(anyhow!(
            "bootstrap resources are incomplete, missing: {}",
            missing.join(", ")
        ));
    }

    debug!(target = %target.display(), files = written.len(), "copied bootstrap");
    Ok(written)
}
