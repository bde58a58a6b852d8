use pyzap_core::{EntryPointMap, EntryPointParseError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

pub const ENTRY_POINTS_FILE: &str = "entry_points.txt";

#[derive(Debug, Error)]
pub enum EntryPointError {
    #[error("no console script named '{console_script}' is declared")]
    NotFound { console_script: String },
    #[error("failed to scan {}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid entry point declarations in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: EntryPointParseError,
    },
}

/// Every `entry_points.txt` below a package root, visited in file name
/// order. Iterating twice walks the tree again.
#[derive(Debug, Clone)]
pub struct EntryPointFiles {
    root: PathBuf,
}

impl EntryPointFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<PathBuf, EntryPointError>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => (entry.file_type().is_file()
                    && entry.file_name() == ENTRY_POINTS_FILE)
                    .then(|| entry.into_path())
                    .map(Ok),
                Err(source) => Some(Err(EntryPointError::Scan {
                    root: self.root.clone(),
                    source,
                })),
            })
    }
}

/// Merges the console scripts of every declaration file under `root`.
pub fn collect_entry_points(root: &Path) -> Result<EntryPointMap, EntryPointError> {
    let mut map = EntryPointMap::new();
    for path in EntryPointFiles::new(root).iter() {
        let path = path?;
        let raw = fs::read_to_string(&path).map_err(|source| EntryPointError::Read {
            path: path.clone(),
            source,
        })?;
        let added = map
            .merge_declarations(&raw)
            .map_err(|source| EntryPointError::Parse {
                path: path.clone(),
                source,
            })?;
        trace!(path = %path.display(), added, "merged entry point declarations");
    }
    debug!(root = %root.display(), console_scripts = map.len(), "collected entry points");
    Ok(map)
}

/// Returns the callable reference declared for `console_script`.
pub fn find_entry_point(root: &Path, console_script: &str) -> Result<String, EntryPointError> {
    collect_entry_points(root)?
        .get(console_script)
        .map(str::to_string)
        .ok_or_else(|| EntryPointError::NotFound {
            console_script: console_script.to_string(),
        })
}
