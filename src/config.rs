use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};
use crate::settings::{CompressionLevel, ReleaseSettings, DEFAULT_PUBLISH_COMMAND};
use crate::version::{Version, VersionType};

/// File-based form of the release settings, loaded from `releaserunner.toml`.
///
/// Covers everything that can be expressed declaratively; custom actions and
/// a version-generator override can only be registered programmatically.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub solution_file: PathBuf,

    pub project_file: PathBuf,

    #[serde(default)]
    pub publish_profile_file: Option<PathBuf>,

    pub bin_dir: PathBuf,

    #[serde(default)]
    pub clean_bin: bool,

    /// Explicit version as a dotted string, e.g. "25.3.0.815"
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub version_type: VersionType,

    #[serde(default)]
    pub create_zip_archive: bool,

    #[serde(default)]
    pub zip_archive_name: String,

    #[serde(default = "default_true")]
    pub attach_version_to_zip_archive_name: bool,

    #[serde(default)]
    pub zip_archive_destination: Option<PathBuf>,

    #[serde(default)]
    pub zip_compression_level: CompressionLevel,

    #[serde(default = "default_publish_command")]
    pub publish_command: String,

    /// Time limit for the publish process in seconds
    #[serde(default)]
    pub publish_timeout_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_publish_command() -> String {
    DEFAULT_PUBLISH_COMMAND.to_string()
}

impl Config {
    /// Converts the file form into runtime settings.
    pub fn into_settings(self) -> Result<ReleaseSettings> {
        let version = match self.version {
            Some(text) => Some(text.parse::<Version>()?),
            None => None,
        };

        Ok(ReleaseSettings {
            solution_file: self.solution_file,
            project_file: self.project_file,
            publish_profile_file: self.publish_profile_file,
            bin_dir: self.bin_dir,
            clean_bin: self.clean_bin,
            version,
            version_type: self.version_type,
            create_zip_archive: self.create_zip_archive,
            zip_archive_name: self.zip_archive_name,
            attach_version_to_zip_archive_name: self.attach_version_to_zip_archive_name,
            zip_archive_destination: self.zip_archive_destination,
            zip_compression_level: self.zip_compression_level,
            publish_command: self.publish_command,
            publish_timeout: self.publish_timeout_secs.map(Duration::from_secs),
            ..ReleaseSettings::default()
        })
    }
}

/// Loads the configuration file.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `releaserunner.toml` in the current directory
/// 3. `.releaserunner.toml` in the user config directory
///
/// Unlike optional tool configuration there is no useful default here (the
/// project paths are required), so a missing file is an error.
///
/// # Arguments
/// * `config_path` - Optional path to a custom configuration file
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let content = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./releaserunner.toml").exists() {
        fs::read_to_string("./releaserunner.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let fallback = config_dir.join(".releaserunner.toml");
        if fallback.exists() {
            fs::read_to_string(fallback)?
        } else {
            return Err(ReleaseError::config(
                "no configuration file found (expected releaserunner.toml)",
            ));
        }
    } else {
        return Err(ReleaseError::config(
            "no configuration file found (expected releaserunner.toml)",
        ));
    };

    let config: Config =
        toml::from_str(&content).map_err(|e| ReleaseError::config(e.to_string()))?;
    Ok(config)
}
