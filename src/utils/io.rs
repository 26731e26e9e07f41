//! File I/O primitives with consistent error handling.

use std::fs;
use std::path::Path;

use crate::core::error::{Error, Result};

/// Write content to a file with standardized error handling.
///
/// Wraps `fs::write` with consistent `output.write_failed` mapping.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::output_write_failed(path, e.to_string()))
}

/// Write content to a file atomically (write to .tmp, then rename).
///
/// The rename is atomic on POSIX filesystems, so readers always see
/// either the old content or the new content, never a partial write.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::output_write_failed(path, "invalid path"))?;
    let filename = path
        .file_name()
        .ok_or_else(|| Error::output_write_failed(path, "invalid path"))?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content)
        .map_err(|e| Error::output_write_failed(path, format!("write temp: {}", e)))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| Error::output_write_failed(path, format!("rename: {}", e)))?;

    Ok(())
}
