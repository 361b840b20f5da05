use std::fs;
use std::path::Path;

use log::debug;

use crate::Result;

/// Removes the complete content of a directory, leaving the directory
/// itself in place. Subdirectories are deleted first, then files.
///
/// An empty or absent path is a no-op, not an error.
pub fn clean_directory(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_dir() {
        return Ok(());
    }

    let entries: Vec<_> = fs::read_dir(path)?.collect::<std::io::Result<_>>()?;

    for entry in entries.iter().filter(|e| e.path().is_dir()) {
        debug!("Delete directory '{}'", entry.path().display());
        fs::remove_dir_all(entry.path())?;
    }

    for entry in entries.iter().filter(|e| e.path().is_file()) {
        debug!("Delete file '{}'", entry.path().display());
        fs::remove_file(entry.path())?;
    }

    Ok(())
}
