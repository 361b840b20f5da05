use std::fmt;

use crate::settings::ReleaseSettings;

/// Pipeline checkpoints at which custom actions may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforeVersionUpdate,
    BeforePublish,
    AfterPublish,
    AfterZip,
}

impl Checkpoint {
    /// Get the checkpoint name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Checkpoint::BeforeVersionUpdate => "before-version-update",
            Checkpoint::BeforePublish => "before-publish",
            Checkpoint::AfterPublish => "after-publish",
            Checkpoint::AfterZip => "after-zip",
        }
    }
}

/// Callback invoked for a hook, with read/write access to the live settings.
///
/// Errors are opaque to the pipeline; whether one aborts the run is decided
/// by the hook's stop-on-failure flag.
pub type HookAction = Box<dyn FnMut(&mut ReleaseSettings) -> anyhow::Result<()>>;

/// A caller-registered action bound to a pipeline checkpoint.
///
/// Hooks are created before the run and invoked in registration order for
/// every checkpoint they match.
pub struct Hook {
    /// Display name used in log output
    pub name: String,
    /// Checkpoint at which the action runs
    pub checkpoint: Checkpoint,
    /// The action itself
    pub action: HookAction,
    /// Abort the whole pipeline when this action fails
    pub stop_on_failure: bool,
}

impl Hook {
    /// Creates a hook that does not abort the pipeline on failure.
    ///
    /// # Arguments
    /// * `name` - Display name used in log output
    /// * `checkpoint` - Checkpoint at which the action runs
    /// * `action` - Callback receiving the live settings
    pub fn new(
        name: impl Into<String>,
        checkpoint: Checkpoint,
        action: impl FnMut(&mut ReleaseSettings) -> anyhow::Result<()> + 'static,
    ) -> Self {
        Hook {
            name: name.into(),
            checkpoint,
            action: Box::new(action),
            stop_on_failure: false,
        }
    }

    /// Sets whether a failure of this hook aborts the remaining pipeline.
    pub fn stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("checkpoint", &self.checkpoint)
            .field("stop_on_failure", &self.stop_on_failure)
            .finish_non_exhaustive()
    }
}
