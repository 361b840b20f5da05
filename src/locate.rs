use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// Determines the directory holding the final executable below the bin root.
///
/// Looks for an immediate child named `Release`. If that directory itself
/// contains an executable file it wins; otherwise its subtree is searched
/// depth-first (explicit stack, unbounded depth) and the first directory
/// containing an executable is returned. Traversal follows filesystem
/// enumeration order, which is platform-dependent.
///
/// `None` means "no release directory" and is not an error.
pub fn find_release_dir(bin_dir: &Path) -> Result<Option<PathBuf>> {
    let release_root = bin_dir.join("Release");
    if !release_root.is_dir() {
        return Ok(None);
    }

    if contains_executable(&release_root)? {
        return Ok(Some(release_root));
    }

    // Depth-first preorder: push children in reverse so the stack pops them
    // in enumeration order.
    let mut stack = subdirectories(&release_root)?;
    stack.reverse();

    while let Some(dir) = stack.pop() {
        if contains_executable(&dir)? {
            return Ok(Some(dir));
        }

        let mut children = subdirectories(&dir)?;
        children.reverse();
        stack.append(&mut children);
    }

    Ok(None)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn contains_executable(dir: &Path) -> Result<bool> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_executable(&path) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A file counts as executable when its unix permission bits say so, or when
/// it carries an `.exe` extension (the build output of a Windows target).
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = path.metadata() {
            if metadata.permissions().mode() & 0o111 != 0 {
                return true;
            }
        }
    }

    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
