use log::{error, info, warn};

use crate::hooks::{Checkpoint, Hook};
use crate::settings::ReleaseSettings;

/// Result of running the hooks of one checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// All matching hooks ran (possibly with non-fatal failures)
    Continue,
    /// A stop-on-failure hook failed; the pipeline must stop
    Abort,
}

impl HookOutcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, HookOutcome::Abort)
    }
}

/// Runs every hook registered for `checkpoint`, in list order.
///
/// Each hook receives the live settings and may read or mutate them. A
/// failing hook with the stop-on-failure flag set is logged as an error and
/// aborts immediately; later hooks at this checkpoint do not run. A failing
/// hook without the flag is logged as a warning and execution continues.
pub fn run_checkpoint(
    hooks: &mut [Hook],
    checkpoint: Checkpoint,
    settings: &mut ReleaseSettings,
) -> HookOutcome {
    for hook in hooks.iter_mut().filter(|h| h.checkpoint == checkpoint) {
        info!("> Execute custom action '{}'", hook.name);

        match (hook.action)(settings) {
            Ok(()) => info!("> Execution done."),
            Err(e) => {
                if hook.stop_on_failure {
                    error!(
                        "An error has occurred while executing the custom action '{}'. \
                         Process will be stopped: {}",
                        hook.name, e
                    );
                    return HookOutcome::Abort;
                }

                warn!(
                    "An error has occurred while executing the custom action '{}': {}",
                    hook.name, e
                );
            }
        }
    }

    HookOutcome::Continue
}
