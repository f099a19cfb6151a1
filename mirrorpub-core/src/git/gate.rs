//! The branch safety gate
//!
//! Every mutating git call (add, commit, push) is preceded by a live query of the checked-out
//! branch. If it is not the document's branch the call is refused before git is invoked.
//! The gate is a check, not a lock: one workflow per repository clone at a time.

use tracing::warn;

use super::vcs::Vcs;
use crate::{Error, Result};

/// Whether working on `current` would write to a branch other than `target`
pub fn is_danger(current: &str, target: &str) -> bool {
    current != target
}

/// Refuse `operation` unless `vcs` is checked out on `target`
pub fn ensure_on_target(vcs: &dyn Vcs, operation: &str, target: &str) -> Result<()> {
    let current = match vcs.current_branch() {
        Ok(branch) => branch,
        Err(e) => {
            warn!(operation, error = %e, "Could not determine the current branch");
            String::from("<unknown>")
        }
    };

    if is_danger(&current, target) {
        warn!(operation, current = %current, target, "Refusing to write to this branch");
        return Err(Error::SafetyViolation {
            operation: operation.to_string(),
            current,
            target: target.to_string(),
        });
    }

    Ok(())
}
