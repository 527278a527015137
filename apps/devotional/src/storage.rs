//! Whole-file writes that never leave a partially written file visible.
//!
//! Contents go to a temp file in the target's directory and are then renamed
//! over (or, for new files, next to) the destination.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::PipelineError;

/// Atomically replaces `path` with `contents`.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let tmp = stage(path, contents)?;
    tmp.persist(path)
        .map_err(|e| PipelineError::fs(path, e.error))?;
    Ok(())
}

/// Atomically creates `path` with `contents`. Fails with `AlreadyExists` if
/// the destination is already present.
pub fn write_new(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let tmp = stage(path, contents)?;
    tmp.persist_noclobber(path)
        .map_err(|e| PipelineError::fs(path, e.error))?;
    Ok(())
}

fn stage(path: &Path, contents: &str) -> Result<NamedTempFile, PipelineError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::fs(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::fs(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| PipelineError::fs(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::fs(tmp.path(), e))?;
    Ok(tmp)
}
