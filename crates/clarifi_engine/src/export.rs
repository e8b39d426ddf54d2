use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export directory missing or not writable: {0}")]
    Directory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes a rendered report to `path`, creating the parent directory when
/// needed. The file is written to a temp file first and renamed into place,
/// so readers never see a half-written report.
pub fn export_report(path: &Path, contents: &str) -> Result<PathBuf, ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if path.exists() {
        fs::remove_file(path)?;
    }
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    engine_info!("Exported report ({} bytes) to {:?}", contents.len(), path);
    Ok(path.to_path_buf())
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ExportError::Directory(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ExportError::Directory(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| ExportError::Directory(e.to_string()))
}
