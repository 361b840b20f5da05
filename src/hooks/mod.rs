//! Custom action system for extensibility
//!
//! Allows callers to run their own code at the pipeline checkpoints:
//! - before-version-update: Before the descriptor version is bumped
//! - before-publish: After cleaning, before the publish process starts
//! - after-publish: After the publish process finished
//! - after-zip: After the release archive was created

pub mod executor;
pub mod lifecycle;

pub use executor::{run_checkpoint, HookOutcome};
pub use lifecycle::{Checkpoint, Hook, HookAction};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ReleaseSettings;

    #[test]
    fn test_empty_hook_list_continues() {
        let mut settings = ReleaseSettings::default();
        let mut hooks: Vec<Hook> = Vec::new();

        let outcome = run_checkpoint(&mut hooks, Checkpoint::BeforeVersionUpdate, &mut settings);

        assert_eq!(outcome, HookOutcome::Continue);
    }
}
