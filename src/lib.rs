pub mod archive;
pub mod clean;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod locate;
pub mod pipeline;
pub mod publish;
pub mod settings;
pub mod version;

pub use error::{ReleaseError, Result};
pub use hooks::{Checkpoint, Hook};
pub use pipeline::create_release;
pub use settings::{CompressionLevel, ReleaseSettings};
pub use version::{Version, VersionType};
