use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};
use crate::hooks::Hook;
use crate::version::{Version, VersionType};

/// Default command for the external publish step
pub const DEFAULT_PUBLISH_COMMAND: &str = "dotnet";

/// Compression level of the release archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionLevel {
    /// Balanced compression (deflate default)
    #[default]
    Optimal,
    /// Fast compression at the cost of size
    Fastest,
    /// Store entries without compression
    NoCompression,
    /// Strongest compression at the cost of speed
    SmallestSize,
}

/// Fallible version-generator override supplied by the caller.
///
/// Receives the old version read from the descriptor and returns the new one.
pub type VersionGenerator = Box<dyn Fn(Version) -> anyhow::Result<Version>>;

/// Settings for a single release run.
///
/// The pipeline reads most fields and writes two of them back: `version`
/// (the generated or preset version) and `zip_archive_destination` (the
/// final path of the created archive). Hooks receive a mutable reference
/// and may adjust any field mid-run.
pub struct ReleaseSettings {
    /// Path of the solution file passed to the publish command
    pub solution_file: PathBuf,
    /// Path of the project descriptor carrying the version elements
    pub project_file: PathBuf,
    /// Optional publish profile, forwarded when it exists as a file
    pub publish_profile_file: Option<PathBuf>,
    /// Path of the build output directory
    pub bin_dir: PathBuf,
    /// Empty the bin directory before publishing
    pub clean_bin: bool,
    /// Explicit version. When unset, a version is generated during the run
    /// and the result is stored here.
    pub version: Option<Version>,
    /// Scheme used by the built-in version generator
    pub version_type: VersionType,
    /// Create a zip archive of the located release directory
    pub create_zip_archive: bool,
    /// Base name of the zip archive (without extension)
    pub zip_archive_name: String,
    /// Append `_v{version}` to the archive name
    pub attach_version_to_zip_archive_name: bool,
    /// Directory the archive is written to; defaults to the bin directory.
    /// After the archive step this holds the full path of the created file.
    pub zip_archive_destination: Option<PathBuf>,
    /// Caller-supplied version generator, used instead of the built-in one
    pub generate_version_number: Option<VersionGenerator>,
    /// Custom actions, executed in list order at their checkpoints
    pub custom_actions: Vec<Hook>,
    /// Compression level of the zip archive
    pub zip_compression_level: CompressionLevel,
    /// External publish command looked up on the execution path
    pub publish_command: String,
    /// Optional time limit for the publish process. Exceeding it kills the
    /// process and is treated as a soft failure.
    pub publish_timeout: Option<Duration>,
}

impl ReleaseSettings {
    /// Creates settings for the given solution, project descriptor and bin
    /// directory, with all optional behavior at its defaults.
    pub fn new(
        solution_file: impl Into<PathBuf>,
        project_file: impl Into<PathBuf>,
        bin_dir: impl Into<PathBuf>,
    ) -> Self {
        ReleaseSettings {
            solution_file: solution_file.into(),
            project_file: project_file.into(),
            bin_dir: bin_dir.into(),
            ..ReleaseSettings::default()
        }
    }

    /// Checks the filesystem preconditions of a run.
    ///
    /// The solution and project files must exist as files and the bin
    /// directory as a directory. The pipeline entry point does not enforce
    /// this itself; callers are expected to validate up front.
    pub fn validate(&self) -> Result<()> {
        if !self.solution_file.is_file() {
            return Err(ReleaseError::settings(format!(
                "solution file '{}' does not exist",
                self.solution_file.display()
            )));
        }

        if !self.project_file.is_file() {
            return Err(ReleaseError::settings(format!(
                "project file '{}' does not exist",
                self.project_file.display()
            )));
        }

        if !self.bin_dir.is_dir() {
            return Err(ReleaseError::settings(format!(
                "bin directory '{}' does not exist",
                self.bin_dir.display()
            )));
        }

        Ok(())
    }
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        ReleaseSettings {
            solution_file: PathBuf::new(),
            project_file: PathBuf::new(),
            publish_profile_file: None,
            bin_dir: PathBuf::new(),
            clean_bin: false,
            version: None,
            version_type: VersionType::default(),
            create_zip_archive: false,
            zip_archive_name: String::new(),
            attach_version_to_zip_archive_name: true,
            zip_archive_destination: None,
            generate_version_number: None,
            custom_actions: Vec::new(),
            zip_compression_level: CompressionLevel::default(),
            publish_command: DEFAULT_PUBLISH_COMMAND.to_string(),
            publish_timeout: None,
        }
    }
}

impl fmt::Debug for ReleaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseSettings")
            .field("solution_file", &self.solution_file)
            .field("project_file", &self.project_file)
            .field("publish_profile_file", &self.publish_profile_file)
            .field("bin_dir", &self.bin_dir)
            .field("clean_bin", &self.clean_bin)
            .field("version", &self.version)
            .field("version_type", &self.version_type)
            .field("create_zip_archive", &self.create_zip_archive)
            .field("zip_archive_name", &self.zip_archive_name)
            .field(
                "attach_version_to_zip_archive_name",
                &self.attach_version_to_zip_archive_name,
            )
            .field("zip_archive_destination", &self.zip_archive_destination)
            .field("custom_actions", &self.custom_actions)
            .field("zip_compression_level", &self.zip_compression_level)
            .field("publish_command", &self.publish_command)
            .field("publish_timeout", &self.publish_timeout)
            .finish_non_exhaustive()
    }
}
