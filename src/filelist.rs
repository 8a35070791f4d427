use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a newline-delimited list of input file paths.
///
/// Entries are trimmed and blank lines are skipped. The order of the
/// returned paths matches the order in the list.
///
/// # Errors
///
/// Returns an error if the list file cannot be read, or if it contains no
/// usable entries.
pub fn read_filelist(path: &Path) -> Result<Vec<PathBuf>> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let files: Vec<PathBuf> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect();

    if files.is_empty() {
        return Err(Error::no_files(path));
    }

    debug!("Read {} entries from {}", files.len(), path.display());
    Ok(files)
}
