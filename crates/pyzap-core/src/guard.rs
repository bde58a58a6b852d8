use std::path::Path;

use crate::error::UserError;

const TARGET_REASON: &str =
    "pyzap already supplies a target internally, so overriding is not allowed.";
const EDITABLE_REASON: &str =
    "Editable installs only link the sources instead of installing them, so they are not allowed.";
const DOWNLOAD_REASON: &str = "pyzap needs to actually perform an install, not merely a download.";

/// Installer flags that would change the install target or break
/// self-containment, with the reason shown to the user.
pub const DISALLOWED_INSTALLER_ARGS: &[(&str, &str)] = &[
    ("-t", TARGET_REASON),
    ("--target", TARGET_REASON),
    ("-e", EDITABLE_REASON),
    ("--editable", EDITABLE_REASON),
    ("-d", DOWNLOAD_REASON),
    ("--download", DOWNLOAD_REASON),
];

/// Rejects any supplied argument that is contained in a disallowed flag.
///
/// Matching is substring containment of the supplied token inside the table
/// key, so `--targ` is rejected while `--target=dir` is passed through.
/// Table order decides which flag is reported when several match.
pub fn validate_installer_args(installer_args: &[String]) -> Result<(), UserError> {
    for &(flag, reason) in DISALLOWED_INSTALLER_ARGS {
        if let Some(arg) = installer_args.iter().find(|arg| flag.contains(arg.as_str())) {
            return Err(UserError::DisallowedArg {
                arg: arg.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Validates everything that must hold before a build may touch the
/// filesystem or start the installer, returning the output path.
///
/// An empty argument list is reported first, then a missing output path,
/// then disallowed arguments.
pub fn validate_build_inputs<'a>(
    output_file: Option<&'a Path>,
    installer_args: &[String],
) -> Result<&'a Path, UserError> {
    if installer_args.is_empty() {
        return Err(UserError::NoInstallerArgs);
    }
    let output_file = output_file.ok_or(UserError::NoOutputFile)?;
    validate_installer_args(installer_args)?;
    Ok(output_file)
}
