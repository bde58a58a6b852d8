use thiserror::Error;

/// Failures caused by what the user asked for, as opposed to a broken
/// environment. The CLI prints these without a context chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("You must supply installer arguments (e.g. a requirement).")]
    NoInstallerArgs,
    #[error("You must provide an output file option! (--output-file/-o)")]
    NoOutputFile,
    #[error("You supplied a disallowed installer argument! '{arg}'\n\n{reason}")]
    DisallowedArg { arg: String, reason: &'static str },
    #[error("No entry point '{console_script}' found in the console_scripts!")]
    NoEntryPoint { console_script: String },
}
