use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use pyzap_builder::{
    build, resolve_host_python, BuildOutcome, BuildRequest, InstallerError, PipInstaller,
};
use pyzap_core::{validate_build_inputs, BuildConfig, BuildSection, UserError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

use render::TerminalRenderer;

const LOG_ENV: &str = "PYZAP_LOG";

#[derive(Parser, Debug)]
#[command(name = "pyzap", version)]
#[command(
    about = "Build fully self-contained, executable Python zip applications",
    long_about = "Build fully self-contained, executable Python zip applications.\n\n\
        Options come first; every remaining argument is passed to pip install."
)]
struct Cli {
    /// The entry point to invoke (module:callable).
    #[arg(short = 'e', long)]
    entry_point: Option<String>,
    /// The console_script to invoke.
    #[arg(short = 'c', long)]
    console_script: Option<String>,
    /// The file to create.
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,
    /// Interpreter written into the archive's #! line.
    #[arg(short = 'p', long)]
    python: Option<String>,
    /// Compress archive members (default).
    #[arg(long, overrides_with = "uncompressed")]
    compressed: bool,
    /// Store archive members without compression.
    #[arg(long, overrides_with = "compressed")]
    uncompressed: bool,
    /// TOML file with a [build] table supplying defaults for these options.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(
        value_name = "INSTALLER_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    installer_args: Vec<String>,
}

impl Cli {
    fn compressed_flag(&self) -> Option<bool> {
        if self.uncompressed {
            Some(false)
        } else if self.compressed {
            Some(true)
        } else {
            None
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let renderer = TerminalRenderer::current();

    match run_cli(cli, renderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            renderer.print_error(&render_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run_cli(cli: Cli, renderer: TerminalRenderer) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BuildConfig::load(path)?,
        None => BuildConfig::default(),
    };
    let request = merge_request(cli, config.build);
    let quiet = is_quiet(&request.installer_args);

    if !quiet {
        renderer.print_banner();
    }

    validate_build_inputs(request.output_file.as_deref(), &request.installer_args)?;

    let python = resolve_host_python()?;
    debug!(python = %python.display(), "resolved host interpreter");

    let spinner = renderer.start_spinner("building");
    let installer = match &spinner {
        Some(spinner) => {
            let spinner = spinner.clone();
            PipInstaller::new(python).with_output(move |line| spinner.println(line))
        }
        None => PipInstaller::new(python),
    };

    let result = build(&request, &installer);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;

    if !quiet {
        for line in format_outcome_lines(&outcome) {
            renderer.print_status("ok", &line);
        }
    }
    Ok(())
}

/// Command-line values win over the config file; installer arguments from
/// the command line replace the file's list when any are given.
fn merge_request(cli: Cli, file: BuildSection) -> BuildRequest {
    let compressed = cli.compressed_flag().or(file.compressed).unwrap_or(true);
    let installer_args = if cli.installer_args.is_empty() {
        file.installer_args
    } else {
        cli.installer_args
    };

    BuildRequest {
        output_file: cli.output_file.or(file.output_file),
        installer_args,
        compressed,
        interpreter: cli.python.or(file.python),
        entry_point: cli.entry_point.or(file.entry_point),
        console_script: cli.console_script.or(file.console_script),
    }
}

fn is_quiet(installer_args: &[String]) -> bool {
    installer_args
        .iter()
        .any(|arg| arg == "-q" || arg == "--quiet")
}

fn format_outcome_lines(outcome: &BuildOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "built {} ({} entries)",
        outcome.output_file.display(),
        outcome.entries
    )];
    if let Some(entry_point) = &outcome.entry_point {
        lines.push(format!("entry point: {entry_point}"));
    }
    lines.push(format!("build id: {}", outcome.build_id));
    lines.push(format!("sha256: {}", outcome.sha256));
    lines
}

/// User mistakes and installer failures print their own message; anything
/// else is an internal failure and prints the whole context chain.
fn render_error(err: &anyhow::Error) -> String {
    if let Some(user_error) = err.downcast_ref::<UserError>() {
        return user_error.to_string();
    }
    if let Some(installer_error) = err.downcast_ref::<InstallerError>() {
        return installer_error.to_string();
    }
    format!("{err:#}")
}
