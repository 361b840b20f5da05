//! The release pipeline
//!
//! Sequences the individual steps into a linear run:
//! hooks(before-version-update) -> version update -> clean bin (optional) ->
//! hooks(before-publish) -> publish -> hooks(after-publish) ->
//! archive (optional) -> hooks(after-zip).
//!
//! Two failure tiers apply. Hard-stop: an aborting hook or a version-update
//! failure ends the run with `false`. Soft-fail: cleaning, publishing and
//! archiving log their failures and the run continues; callers hook in a
//! custom action when they need a failed build to stop the pipeline.

use std::mem;

use log::{error, info, warn};

use crate::hooks::{self, Checkpoint, Hook};
use crate::settings::ReleaseSettings;
use crate::{archive, clean, descriptor, publish};

/// Creates the release described by `settings`.
///
/// Returns `true` when the pipeline ran to completion and `false` when it
/// was aborted by a hook or a version-update failure. No error escapes this
/// call; everything is reported through the log.
///
/// The generated version and the final archive path are written back into
/// `settings`.
pub fn create_release(settings: &mut ReleaseSettings) -> bool {
    info!("Start publish process.");

    // Detach the hook list for the duration of the run so it is never
    // mutated while being iterated.
    let mut hook_list = mem::take(&mut settings.custom_actions);
    let result = run_stages(settings, &mut hook_list);
    settings.custom_actions = hook_list;

    info!("Publish process done.");
    result
}

fn run_stages(settings: &mut ReleaseSettings, hook_list: &mut [Hook]) -> bool {
    if run_hooks(hook_list, Checkpoint::BeforeVersionUpdate, settings) {
        return false;
    }

    if descriptor::update_version(settings).is_err() {
        return false;
    }

    if settings.clean_bin {
        info!("Clean bin directory.");
        if let Err(e) = clean::clean_directory(&settings.bin_dir) {
            warn!("An error has occurred while cleaning the bin directory: {}", e);
        }
    }

    if run_hooks(hook_list, Checkpoint::BeforePublish, settings) {
        return false;
    }

    if let Err(e) = publish::run_publish(settings) {
        error!(
            "An error has occurred while creating / publishing the release: {}",
            e
        );
    }

    if run_hooks(hook_list, Checkpoint::AfterPublish, settings) {
        return false;
    }

    if !settings.create_zip_archive {
        info!("Done.");
        return true;
    }

    let zip_file = archive_destination(settings);
    settings.zip_archive_destination = Some(zip_file.clone());

    if let Err(e) = archive::zip_release(
        &settings.bin_dir,
        &zip_file,
        settings.zip_compression_level,
    ) {
        warn!("An error has occurred while creating the ZIP archive: {}", e);
    }

    !run_hooks(hook_list, Checkpoint::AfterZip, settings)
}

/// Runs one checkpoint; `true` means the pipeline must abort.
fn run_hooks(
    hook_list: &mut [Hook],
    checkpoint: Checkpoint,
    settings: &mut ReleaseSettings,
) -> bool {
    hooks::run_checkpoint(hook_list, checkpoint, settings).is_abort()
}

/// Computes the full path of the archive and reflects the naming options:
/// `{name}_v{version}.zip` with the version attached, `{name}.zip` without,
/// placed in the configured destination directory or the bin directory.
fn archive_destination(settings: &ReleaseSettings) -> std::path::PathBuf {
    let archive_name = if settings.attach_version_to_zip_archive_name {
        let version = settings.version.unwrap_or_default();
        format!("{}_v{}.zip", settings.zip_archive_name, version)
    } else {
        format!("{}.zip", settings.zip_archive_name)
    };

    let destination = match &settings.zip_archive_destination {
        Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
        _ => settings.bin_dir.clone(),
    };

    destination.join(archive_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use std::path::PathBuf;

    #[test]
    fn test_archive_name_with_version() {
        let mut settings = ReleaseSettings::default();
        settings.bin_dir = PathBuf::from("/tmp/bin");
        settings.zip_archive_name = "MyApp".to_string();
        settings.version = Some(Version::new(25, 3, 1, 600));

        assert_eq!(
            archive_destination(&settings),
            PathBuf::from("/tmp/bin/MyApp_v25.3.1.600.zip")
        );
    }

    #[test]
    fn test_archive_name_without_version() {
        let mut settings = ReleaseSettings::default();
        settings.bin_dir = PathBuf::from("/tmp/bin");
        settings.zip_archive_name = "MyApp".to_string();
        settings.attach_version_to_zip_archive_name = false;

        assert_eq!(
            archive_destination(&settings),
            PathBuf::from("/tmp/bin/MyApp.zip")
        );
    }

    #[test]
    fn test_explicit_destination_overrides_bin_dir() {
        let mut settings = ReleaseSettings::default();
        settings.bin_dir = PathBuf::from("/tmp/bin");
        settings.zip_archive_name = "MyApp".to_string();
        settings.attach_version_to_zip_archive_name = false;
        settings.zip_archive_destination = Some(PathBuf::from("/tmp/out"));

        assert_eq!(
            archive_destination(&settings),
            PathBuf::from("/tmp/out/MyApp.zip")
        );
    }
}
