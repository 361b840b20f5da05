//! Project descriptor editing
//!
//! Reads and rewrites the version elements of an XML project descriptor
//! (`AssemblyVersion`, `FileVersion`, `Version`) and owns the backup and
//! rollback of the file during a version update.

use std::fs;
use std::path::Path;

use log::{debug, error, info, warn};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use tempfile::NamedTempFile;

use crate::error::{ReleaseError, Result};
use crate::settings::ReleaseSettings;
use crate::version::{self, Version, VersionType};

/// Element names which can carry the version number, in lookup priority order
const VERSION_ELEMENTS: [&str; 3] = ["AssemblyVersion", "FileVersion", "Version"];

/// Version returned when the descriptor carries no parsable version element
const FALLBACK_VERSION: Version = Version {
    major: 1,
    minor: 0,
    build: 0,
    revision: 0,
};

fn element_index(local_name: &[u8]) -> Option<usize> {
    VERSION_ELEMENTS
        .iter()
        .position(|name| name.as_bytes() == local_name)
}

/// Reads the version number from the descriptor.
///
/// Collects the text of the first occurrence of each version element and
/// returns the first value, in priority order, that parses as a version. If
/// none does, a warning is emitted and the default `1.0.0.0` is returned.
pub fn read_version(path: &Path) -> Result<Version> {
    let content = fs::read_to_string(path)?;

    let mut found: [Option<String>; 3] = [None, None, None];
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);

    let mut current: Option<usize> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = element_index(e.local_name().as_ref()).filter(|&i| found[i].is_none());
            }
            Event::Text(t) => {
                if let Some(i) = current {
                    found[i] = Some(t.unescape()?.into_owned());
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    for text in found.iter().flatten() {
        if let Ok(parsed) = text.parse::<Version>() {
            return Ok(parsed);
        }
    }

    warn!(
        "No version element found in '{}'. Fallback to default version: {}",
        path.display(),
        FALLBACK_VERSION
    );
    Ok(FALLBACK_VERSION)
}

/// Writes the version number into the descriptor.
///
/// The first occurrence of every version element that is present gets its
/// text replaced with the canonical string form of `version`; self-closing
/// elements gain a text value. Everything else is passed through unchanged.
pub fn write_version(path: &Path, version: &Version) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let text = version.to_string();

    let mut reader = Reader::from_str(&content);
    let mut writer = Writer::new(Vec::new());

    let mut replaced = [false; 3];
    let mut skipping = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match element_index(e.local_name().as_ref()).filter(|&i| !replaced[i]) {
                    Some(i) => {
                        replaced[i] = true;
                        skipping = true;
                        writer.write_event(Event::Start(e))?;
                        writer.write_event(Event::Text(BytesText::new(&text)))?;
                    }
                    None => writer.write_event(Event::Start(e))?,
                }
            }
            Event::Empty(e) => {
                match element_index(e.local_name().as_ref()).filter(|&i| !replaced[i]) {
                    Some(i) => {
                        replaced[i] = true;
                        let end = e.to_end().into_owned();
                        writer.write_event(Event::Start(e))?;
                        writer.write_event(Event::Text(BytesText::new(&text)))?;
                        writer.write_event(Event::End(end))?;
                    }
                    None => writer.write_event(Event::Empty(e))?,
                }
            }
            // Drop the original value of an element being replaced
            Event::Text(_) if skipping => {}
            Event::End(e) => {
                skipping = false;
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    fs::write(path, writer.into_inner())?;
    Ok(())
}

/// Updates the version number of the project descriptor.
///
/// Procedure: snapshot the descriptor to a backup file, read the old
/// version, compute the new one (explicit preset wins, then the caller
/// generator, then the built-in generator), write it and drop the backup.
/// Any failure after the snapshot restores the descriptor from the backup,
/// so the file is never left partially edited. This is the pipeline's only
/// rollback path; the pipeline aborts when it reports an error.
pub fn update_version(settings: &mut ReleaseSettings) -> Result<()> {
    let format = match settings.version_type {
        VersionType::CalendarWeek => "with calendar week",
        _ => "with day of the year",
    };
    info!("Update version number. Format: {}", format);

    debug!("Create backup of the original file.");
    let backup = create_backup(&settings.project_file)?;
    debug!("Backup file: {}", backup.path().display());

    match apply_update(settings) {
        Ok(()) => {
            debug!("Delete backup");
            if let Err(e) = backup.close() {
                warn!("Could not remove backup file: {}", e);
            }
            Ok(())
        }
        Err(e) => {
            error!(
                "An error has occurred while updating the version number: {}",
                e
            );
            info!("Perform rollback of project file.");
            if let Err(rollback_err) = fs::copy(backup.path(), &settings.project_file) {
                error!("Rollback of the project file failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

fn create_backup(path: &Path) -> Result<NamedTempFile> {
    let backup = NamedTempFile::new()?;
    fs::copy(path, backup.path())?;
    Ok(backup)
}

fn apply_update(settings: &mut ReleaseSettings) -> Result<()> {
    debug!(
        "Load current version number from file '{}'.",
        settings.project_file.display()
    );
    let old_version = read_version(&settings.project_file)?;
    info!("Old version number: {}", old_version);

    let new_version = match settings.version {
        Some(preset) => preset,
        None => {
            debug!("Generate new version number.");
            match &settings.generate_version_number {
                Some(generate) => generate(old_version).map_err(|e| {
                    ReleaseError::version(format!("custom version generator failed: {}", e))
                })?,
                None => version::generate_next(old_version, settings.version_type),
            }
        }
    };
    settings.version = Some(new_version);
    info!("New version number: {}", new_version);

    write_version(&settings.project_file, &new_version)?;
    info!("Version updated.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::path::PathBuf;

    fn write_descriptor(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.csproj");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    const PLAIN_PROJECT: &str = "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <OutputType>Exe</OutputType>\n    <Version>1.2.3.4</Version>\n  </PropertyGroup>\n</Project>";

    #[test]
    fn test_read_version_from_version_element() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        assert_eq!(read_version(&path).unwrap(), Version::new(1, 2, 3, 4));
    }

    #[test]
    fn test_read_prefers_assembly_version() {
        let (_dir, path) = write_descriptor(
            "<Project><PropertyGroup>\
             <Version>9.9.9.9</Version>\
             <AssemblyVersion>1.0.0.1</AssemblyVersion>\
             </PropertyGroup></Project>",
        );
        assert_eq!(read_version(&path).unwrap(), Version::new(1, 0, 0, 1));
    }

    #[test]
    fn test_read_skips_unparsable_element() {
        let (_dir, path) = write_descriptor(
            "<Project><PropertyGroup>\
             <AssemblyVersion>$(SharedVersion)</AssemblyVersion>\
             <FileVersion>2.5.0.0</FileVersion>\
             </PropertyGroup></Project>",
        );
        assert_eq!(read_version(&path).unwrap(), Version::new(2, 5, 0, 0));
    }

    #[test]
    fn test_read_falls_back_to_default() {
        let (_dir, path) =
            write_descriptor("<Project><PropertyGroup></PropertyGroup></Project>");
        assert_eq!(read_version(&path).unwrap(), Version::new(1, 0, 0, 0));
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        let version = Version::new(25, 33, 2, 815);
        write_version(&path, &version).unwrap();
        assert_eq!(read_version(&path).unwrap(), version);
    }

    #[test]
    fn test_write_updates_every_element_name() {
        let (_dir, path) = write_descriptor(
            "<Project><PropertyGroup>\
             <AssemblyVersion>1.0.0.0</AssemblyVersion>\
             <FileVersion>1.0.0.0</FileVersion>\
             <Version>1.0.0.0</Version>\
             </PropertyGroup></Project>",
        );
        write_version(&path, &Version::new(2, 3, 4, 5)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("2.3.4.5").count(), 3);
        assert!(!content.contains("1.0.0.0"));
    }

    #[test]
    fn test_write_fills_self_closing_element() {
        let (_dir, path) =
            write_descriptor("<Project><PropertyGroup><Version/></PropertyGroup></Project>");
        write_version(&path, &Version::new(3, 1, 0, 0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<Version>3.1.0.0</Version>"));
    }

    #[test]
    fn test_write_leaves_other_content_untouched() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        write_version(&path, &Version::new(2, 0, 0, 0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<OutputType>Exe</OutputType>"));
        assert!(content.contains("Microsoft.NET.Sdk"));
    }

    #[test]
    fn test_update_generates_and_stores_version() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        let mut settings = ReleaseSettings::default();
        settings.project_file = path.clone();

        update_version(&mut settings).unwrap();

        let stored = settings.version.expect("version written back");
        assert_eq!(read_version(&path).unwrap(), stored);
    }

    #[test]
    fn test_update_respects_preset_version() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        let mut settings = ReleaseSettings::default();
        settings.project_file = path.clone();
        settings.version = Some(Version::new(7, 7, 7, 7));

        update_version(&mut settings).unwrap();

        assert_eq!(read_version(&path).unwrap(), Version::new(7, 7, 7, 7));
    }

    #[test]
    fn test_update_uses_custom_generator() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        let mut settings = ReleaseSettings::default();
        settings.project_file = path.clone();
        settings.generate_version_number = Some(Box::new(|old| {
            Ok(Version::new(old.major + 1, 0, 0, 0))
        }));

        update_version(&mut settings).unwrap();

        assert_eq!(settings.version, Some(Version::new(2, 0, 0, 0)));
        assert_eq!(read_version(&path).unwrap(), Version::new(2, 0, 0, 0));
    }

    #[test]
    fn test_failed_update_rolls_back_descriptor() {
        let (_dir, path) = write_descriptor(PLAIN_PROJECT);
        let before = fs::read_to_string(&path).unwrap();

        let mut settings = ReleaseSettings::default();
        settings.project_file = path.clone();
        settings.generate_version_number =
            Some(Box::new(|_| bail!("generator blew up")));

        assert!(update_version(&mut settings).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert!(settings.version.is_none());
    }

    #[test]
    fn test_update_fails_when_descriptor_missing() {
        let mut settings = ReleaseSettings::default();
        settings.project_file = PathBuf::from("/nonexistent/app.csproj");
        assert!(update_version(&mut settings).is_err());
    }
}
