use anyhow::{anyhow, Result};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use thiserror::Error;
use tracing::debug;

pub const PYTHON_ENV: &str = "PYZAP_PYTHON";
const PIP_REQUIRE_VIRTUALENV: &str = "PIP_REQUIRE_VIRTUALENV";

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Installer failed to start: {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Installer failed: {status}{}", render_detail(.detail))]
    Failed { status: String, detail: String },
}

fn render_detail(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!("\n{detail}")
    }
}

/// Installs packages into a directory named by a `--target DIR` pair
/// somewhere in `args`.
pub trait Installer {
    fn install(&self, args: &[String]) -> Result<(), InstallerError>;

    /// Interpreter the installer runs under, used as the default
    /// interpreter directive of the built archive.
    fn interpreter(&self) -> Option<&Path> {
        None
    }
}

type OutputSink = Box<dyn Fn(&str) + Send + Sync>;

/// Runs `python -m pip install` as a child process.
pub struct PipInstaller {
    python: PathBuf,
    output: OutputSink,
}

impl std::fmt::Debug for PipInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipInstaller")
            .field("python", &self.python)
            .finish_non_exhaustive()
    }
}

impl PipInstaller {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            output: Box::new(|line| println!("{line}")),
        }
    }

    /// Receives every line pip writes to stdout.
    pub fn with_output(mut self, output: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub(crate) fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.python);
        command
            .arg("-m")
            .arg("pip")
            .arg("--disable-pip-version-check")
            .arg("install")
            .args(args)
            .env_remove(PIP_REQUIRE_VIRTUALENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Installer for PipInstaller {
    fn install(&self, args: &[String]) -> Result<(), InstallerError> {
        let mut command = self.command(args);
        debug!(python = %self.python.display(), ?args, "running pip");
        let spawn_error = |source| InstallerError::Spawn {
            program: self.python.display().to_string(),
            source,
        };
        let mut child = command.spawn().map_err(spawn_error)?;

        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut captured = String::new();
                let _ = stderr.read_to_string(&mut captured);
                captured
            })
        });

        if let Some(stdout) = child.stdout.take() {
            forward_lines(BufReader::new(stdout), &*self.output);
        }

        let status = child.wait().map_err(spawn_error)?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        check_status(status, &stderr)
    }

    fn interpreter(&self) -> Option<&Path> {
        Some(&self.python)
    }
}

/// Hands every line of `reader` to `sink` until EOF. Bytes that are not
/// UTF-8 are replaced rather than ending the stream. After a read error the
/// rest is drained so the child never writes into a closed pipe.
pub(crate) fn forward_lines(mut reader: impl BufRead, sink: &dyn Fn(&str)) {
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return,
            Ok(_) => sink(String::from_utf8_lossy(&line).trim_end()),
            Err(err) => {
                debug!(error = %err, "stopped forwarding installer output");
                let _ = io::copy(&mut reader, &mut io::sink());
                return;
            }
        }
    }
}

fn check_status(status: ExitStatus, stderr: &str) -> Result<(), InstallerError> {
    if status.success() {
        return Ok(());
    }
    Err(InstallerError::Failed {
        status: status.to_string(),
        detail: stderr.trim().to_string(),
    })
}

/// Python used to run pip: `PYZAP_PYTHON`, else `python3` or `python` on
/// `PATH`.
pub fn resolve_host_python() -> Result<PathBuf> {
    if let Some(value) = std::env::var_os(PYTHON_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }

    for candidate in ["python3", "python"] {
        if let Ok(path) = which::which(candidate) {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "could not find a Python interpreter on PATH; set {PYTHON_ENV} to the interpreter to install with"
    ))
}
