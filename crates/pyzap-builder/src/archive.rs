use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fs_utils::{archive_name, sha256_file, sorted_relative_entries};

pub const MAIN_FILE: &str = "__main__.py";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub target: PathBuf,
    /// Written as the `#!` line when present.
    pub interpreter: Option<String>,
    /// `module:function` invoked by the generated `__main__.py`.
    pub main: String,
    pub compressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: usize,
    pub sha256: String,
}

/// Packs `source` into an executable zip at `options.target`.
///
/// The archive is assembled in a temporary file next to the target and
/// renamed over it once complete, so the target path never holds a partial
/// archive and is left untouched on failure.
pub fn create_archive(source: &Path, options: &ArchiveOptions) -> Result<ArchiveSummary> {
    let main_py = render_main(&options.main)?;
    if source.join(MAIN_FILE).exists() {
        return Err(anyhow!(
            "cannot set a main callable because {} already contains {MAIN_FILE}",
            source.display()
        ));
    }

    let parent = match options.target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(&parent)
        .with_context(|| format!("failed to create temporary archive in {}", parent.display()))?;
    let entries = write_archive(staged.as_file_mut(), source, options, &main_py)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755)).with_context(
            || format!("failed to mark {} executable", staged.path().display()),
        )?;
    }

    let sha256 = sha256_file(staged.path())?;
    staged
        .persist(&options.target)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to write archive: {}", options.target.display()))?;

    debug!(
        target = %options.target.display(),
        entries,
        compressed = options.compressed,
        "wrote archive"
    );
    Ok(ArchiveSummary {
        path: options.target.clone(),
        entries,
        sha256,
    })
}

fn write_archive(
    file: &mut fs::File,
    source: &Path,
    options: &ArchiveOptions,
    main_py: &str,
) -> Result<usize> {
    if let Some(interpreter) = &options.interpreter {
        file.write_all(format!("#!{interpreter}\n").as_bytes())
            .context("failed to write interpreter line")?;
    }

    let method = if options.compressed {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let base = SimpleFileOptions::default().compression_method(method);

    let mut zip = ZipWriter::new(file);
    let mut count = 0;
    for (rel, is_dir) in sorted_relative_entries(source)? {
        let name = archive_name(&rel)?;
        let full_path = source.join(&rel);
        if is_dir {
            zip.add_directory(format!("{name}/"), base)
                .with_context(|| format!("failed to add directory to archive: {name}"))?;
        } else {
            let mut src = fs::File::open(&full_path)
                .with_context(|| format!("failed to open {}", full_path.display()))?;
            zip.start_file(name.clone(), file_options(base, &src))
                .with_context(|| format!("failed to add file to archive: {name}"))?;
            io::copy(&mut src, &mut zip)
                .with_context(|| format!("failed to write file to archive: {name}"))?;
        }
        count += 1;
    }

    zip.start_file(MAIN_FILE, base.unix_permissions(0o644))
        .context("failed to add __main__.py to archive")?;
    zip.write_all(main_py.as_bytes())
        .context("failed to write __main__.py")?;
    count += 1;

    let file = zip.finish().context("failed to finalize archive")?;
    file.sync_all().context("failed to flush archive")?;
    Ok(count)
}

#[cfg(unix)]
fn file_options(base: SimpleFileOptions, src: &fs::File) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    match src.metadata() {
        Ok(metadata) => base.unix_permissions(metadata.permissions().mode() & 0o777),
        Err(_) => base,
    }
}

#[cfg(not(unix))]
fn file_options(base: SimpleFileOptions, _src: &fs::File) -> SimpleFileOptions {
    base
}

fn render_main(main: &str) -> Result<String> {
    let (module, function) = main
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid main callable '{main}': expected 'module:function'"))?;
    if !is_dotted_identifier(module) || !is_dotted_identifier(function) {
        return Err(anyhow!(
            "invalid main callable '{main}': expected 'module:function'"
        ));
    }
    Ok(format!(
        "# -*- coding: utf-8 -*-\nimport {module}\n{module}.{function}()\n"
    ))
}

fn is_dotted_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(first) if first == '_' || first.is_alphabetic())
                && chars.all(|ch| ch == '_' || ch.is_alphanumeric())
        })
}
