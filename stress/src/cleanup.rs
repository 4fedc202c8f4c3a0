//! Post-run artifact removal.
//!
//! Partial cleanup keeps input, outputs and the diff record so a failure can
//! be inspected; full cleanup leaves only the sources behind. Deletion is
//! best effort: failures are logged and never change the run's verdict.

use std::io::Write;

use tracing::{instrument, warn};

use crate::core::types::CleanupPolicy;
use crate::io::console::Console;
use crate::io::facade::{DeleteFailure, ProcessFacade};
use crate::io::paths::HarnessPaths;

/// Remove the artifacts `policy` covers. Returns the paths that could not be removed.
#[instrument(skip_all, fields(policy = ?policy))]
pub fn cleanup<P: ProcessFacade, O: Write, E: Write>(
    policy: CleanupPolicy,
    paths: &HarnessPaths,
    facade: &P,
    console: &mut Console<O, E>,
) -> Vec<DeleteFailure> {
    let mut failures = facade.delete_paths(&paths.executables());
    report(console, "Executables cleaned up");

    if policy == CleanupPolicy::Full {
        let mut targets = paths.data_files();
        targets.push(paths.diff_record.clone());
        failures.extend(facade.delete_paths(&targets));
        report(console, "All temporary files cleaned up");
    }

    for failure in &failures {
        warn!(path = %failure.path.display(), err = %failure.error, "failed to delete artifact");
    }
    failures
}

fn report<O: Write, E: Write>(console: &mut Console<O, E>, text: &str) {
    if let Err(err) = console.line(text) {
        warn!(err = %err, "failed to write cleanup status");
    }
}
