mod config;
mod entry_points;
mod environment;
mod error;
mod guard;

pub use config::{BuildConfig, BuildSection};
pub use entry_points::{parse_entry_points, EntryPointMap, EntryPointParseError};
pub use environment::Environment;
pub use error::UserError;
pub use guard::{validate_build_inputs, validate_installer_args, DISALLOWED_INSTALLER_ARGS};

/// Section of `entry_points.txt` that declares console commands.
pub const CONSOLE_SCRIPTS_SECTION: &str = "console_scripts";

#[cfg(test)]
mod tests;
