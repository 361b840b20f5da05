use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::locate;
use crate::settings::CompressionLevel;
use crate::Result;

/// Creates the zip archive of the release.
///
/// Locates the release directory below `bin_dir` first; when none is found
/// the step is skipped with a warning, which is not a failure. The archive
/// root is the content of the release directory, not the directory itself.
pub fn zip_release(bin_dir: &Path, zip_file: &Path, level: CompressionLevel) -> Result<()> {
    let release_dir = match locate::find_release_dir(bin_dir)? {
        Some(dir) => dir,
        None => {
            warn!("Can't determine release dir. Skip ZIP process.");
            return Ok(());
        }
    };

    info!(
        "ZIP content of '{}' into '{}'. Compression level: {:?}",
        release_dir.display(),
        zip_file.display(),
        level
    );

    let file = fs::File::create(zip_file)?;
    let mut zip = ZipWriter::new(file);
    add_directory(&mut zip, &release_dir, &release_dir, file_options(level))?;
    zip.finish()?;
    Ok(())
}

fn file_options(level: CompressionLevel) -> SimpleFileOptions {
    match level {
        CompressionLevel::Optimal => {
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
        }
        CompressionLevel::Fastest => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(1)),
        CompressionLevel::NoCompression => {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        }
        CompressionLevel::SmallestSize => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9)),
    }
}

/// Recursively add directory contents to the archive, naming entries
/// relative to `base`.
fn add_directory(
    zip: &mut ZipWriter<fs::File>,
    dir: &Path,
    base: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            add_directory(zip, &path, base, options)?;
        } else {
            let name = path
                .strip_prefix(base)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            zip.start_file(name, options)?;
            io::copy(&mut fs::File::open(&path)?, zip)?;
        }
    }
    Ok(())
}
