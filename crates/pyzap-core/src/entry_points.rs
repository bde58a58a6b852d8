use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use thiserror::Error;

use crate::CONSOLE_SCRIPTS_SECTION;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryPointParseError {
    #[error("line {line}: declaration appears before any [section] header")]
    MissingSectionHeader { line: usize },
    #[error("line {line}: expected 'name = value', found '{content}'")]
    InvalidLine { line: usize, content: String },
    #[error("line {line}: unterminated section header '{content}'")]
    InvalidSectionHeader { line: usize, content: String },
}

/// Console command name to callable reference, merged across every
/// `entry_points.txt` of a staged package tree.
///
/// Names are case-folded to lowercase. When a name is declared more than
/// once the first declaration merged in wins; later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointMap {
    console_scripts: BTreeMap<String, String>,
}

impl EntryPointMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the `console_scripts` section of one declaration file.
    pub fn merge_declarations(&mut self, raw: &str) -> Result<usize, EntryPointParseError> {
        let mut added = 0;
        for (name, target) in parse_entry_points(raw)?
            .remove(CONSOLE_SCRIPTS_SECTION)
            .unwrap_or_default()
        {
            if self.insert_first(&name, &target) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Inserts unless the name is already present. Returns whether it was added.
    pub fn insert_first(&mut self, name: &str, target: &str) -> bool {
        match self.console_scripts.entry(name.to_lowercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(target.to_string());
                true
            }
        }
    }

    pub fn get(&self, console_script: &str) -> Option<&str> {
        self.console_scripts
            .get(&console_script.to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.console_scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.console_scripts.is_empty()
    }
}

/// Parses the INI dialect used by `entry_points.txt` into
/// section -> ordered `(name, value)` pairs.
///
/// Supports `[section]` headers, `name = value` and `name: value`
/// declarations, full-line `#` / `;` comments and indented continuation
/// lines. Option names are lowercased; values are trimmed.
pub fn parse_entry_points(
    raw: &str,
) -> Result<BTreeMap<String, Vec<(String, String)>>, EntryPointParseError> {
    let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (index, line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented {
            if let Some(section) = &current {
                if let Some((_, value)) = sections.get_mut(section).and_then(|s| s.last_mut()) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(EntryPointParseError::InvalidSectionHeader {
                    line: line_no,
                    content: trimmed.to_string(),
                });
            };
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some(section) = &current else {
            return Err(EntryPointParseError::MissingSectionHeader { line: line_no });
        };

        let Some(split_at) = trimmed.find(['=', ':']) else {
            return Err(EntryPointParseError::InvalidLine {
                line: line_no,
                content: trimmed.to_string(),
            });
        };
        let name = trimmed[..split_at].trim().to_lowercase();
        let value = trimmed[split_at + 1..].trim().to_string();
        if name.is_empty() {
            return Err(EntryPointParseError::InvalidLine {
                line: line_no,
                content: trimmed.to_string(),
            });
        }

        sections
            .entry(section.clone())
            .or_default()
            .push((name, value));
    }

    Ok(sections)
}
