//! Atomic file writes: temp file in the target directory, fsync, rename.
//!
//! Used for the workflow store and for `.genius/STATE.json`, which another
//! tool reads concurrently. Readers must never observe a half-written file.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// EXDEV on Linux and macOS.
#[cfg(unix)]
const CROSS_DEVICE_ERRNO: i32 = 18;

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Bytes written after line ending normalization
    pub bytes_written: usize,
    /// Whether the copy fallback was needed because the rename crossed filesystems
    pub used_cross_filesystem_fallback: bool,
    pub warnings: Vec<String>,
}

/// Atomically write UTF-8 `content` to `path`, creating parent directories.
///
/// Line endings are normalized to LF.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<AtomicWriteResult> {
    let mut result = AtomicWriteResult::default();
    let normalized = normalize_line_endings(content);
    result.bytes_written = normalized.len();

    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create parent directory: {dir}"))?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in: {dir}"))?;
    temp_file
        .write_all(normalized.as_bytes())
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    let temp_path = temp_file.path().to_path_buf();
    match temp_file.persist(path.as_std_path()) {
        Ok(_) => {}
        Err(e) if is_cross_filesystem_error(&e.error) => {
            result.used_cross_filesystem_fallback = true;
            result
                .warnings
                .push("Used cross-filesystem fallback (copy, fsync, replace)".to_string());
            copy_into_place(&temp_path, path, dir)?;
            // keep the original temp file alive until the copy has landed
            drop(e.file);
        }
        Err(e) => {
            return Err(anyhow::Error::new(e.error))
                .with_context(|| format!("Failed to atomically write file: {path}"));
        }
    }

    tracing::debug!(path = %path, bytes = result.bytes_written, "Atomic write complete");
    Ok(result)
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(unix)]
fn is_cross_filesystem_error(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(CROSS_DEVICE_ERRNO)
}

#[cfg(not(unix))]
fn is_cross_filesystem_error(_err: &std::io::Error) -> bool {
    false
}

fn copy_into_place(temp_path: &Path, target: &Utf8Path, dir: &Utf8Path) -> Result<()> {
    let content =
        fs::read(temp_path).context("Failed to read temporary file for cross-filesystem copy")?;

    let mut target_temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in target directory: {dir}"))?;
    target_temp
        .write_all(&content)
        .context("Failed to write content during cross-filesystem copy")?;
    target_temp
        .as_file()
        .sync_all()
        .context("Failed to fsync during cross-filesystem copy")?;
    target_temp
        .persist(target.as_std_path())
        .map_err(|e| anyhow::Error::new(e.error))
        .context("Failed to persist during cross-filesystem copy")?;
    Ok(())
}

/// Read a file, normalizing CRLF to LF.
pub fn read_file_normalized(path: &Utf8Path) -> Result<String> {
    let content = fs::read_to_string(path.as_std_path())
        .with_context(|| format!("Failed to read file: {path}"))?;
    Ok(normalize_line_endings(&content))
}
