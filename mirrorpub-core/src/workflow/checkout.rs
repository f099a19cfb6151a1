//! Resuming a previously published document by its key

use tracing::{error, info, warn};

use crate::destination::DestinationKind;
use crate::metadata::key_and_series;
use crate::pointer::CurrentPointer;
use crate::session::Session;
use crate::{Error, Result};

/// How a checkout ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The key already is the current document; only the workspace was switched
    Unchanged {
        /// Whether the workspace ended up on the document's branch
        on_target: bool,
    },
    /// Pointer and workspace were switched
    Switched {
        pointer: CurrentPointer,
        /// Whether the workspace ended up on the document's branch
        on_target: bool,
    },
    /// Only resolved, nothing written
    DryRun { pointer: CurrentPointer },
}

/// Find the series of `key` among the metadata files of the base repository
///
/// Exactly one metadata file must be named after the key.
pub fn resolve_series(session: &Session, key: &str) -> Result<String> {
    let mut found: Vec<String> = session
        .layout()
        .metadata_files()?
        .iter()
        .filter_map(|path| key_and_series(path))
        .filter(|(k, _)| k == key)
        .map(|(_, series)| series)
        .collect();

    match found.len() {
        0 => Err(Error::Resolution(format!(
            "no metadata file found for key '{}'",
            key
        ))),
        1 => Ok(found.remove(0)),
        n => Err(Error::Resolution(format!(
            "{} metadata files found for key '{}' in series {:?}",
            n, key, found
        ))),
    }
}

/// Point the tool at `key` and bring `kind`'s clone onto its branch
///
/// When `key` already is the current document the pointer is left alone but the clone is
/// still switched. A key without any branch gets a new branch from main during
/// initialization; this is logged, not refused.
pub fn checkout(session: &Session, kind: DestinationKind, key: &str) -> Result<CheckoutOutcome> {
    let current = session.pointer().ok();
    if let Some(current) = &current {
        info!(pointer = %current.key, series = %current.series, "Before checkout");
    }

    let (pointer, changed) = match current.filter(|c| c.key == key) {
        Some(current) => {
            info!(key, "Already the current document, pointer kept");
            (current, false)
        }
        None => {
            let series = resolve_series(session, key)?;
            (CurrentPointer::from_key(key, series)?, true)
        }
    };

    if session.toggles().dry_run {
        info!(key, series = %pointer.series, "DRY RUN: pointer and workspace not updated");
        return Ok(CheckoutOutcome::DryRun { pointer });
    }

    if changed {
        pointer.save(session.store())?;
        info!(key, series = %pointer.series, "Current document updated");
    }

    let adapter = session.adapter(kind, &pointer.key);
    if !adapter.branch_exists_local() && !adapter.branch_exists_remote() {
        warn!(
            key,
            repo = %adapter.repo_name(),
            "No branch for this key, initialization will create it from the main line"
        );
    }

    if !adapter.initialize() {
        warn!(repo = %adapter.repo_name(), "Initialization did not complete");
    }

    let on_target = !adapter.is_danger_here();
    if !on_target {
        error!(
            repo = %adapter.repo_name(),
            target = %pointer.key,
            "Workspace is not on the document's branch, resolve it before writing"
        );
    }

    if changed {
        Ok(CheckoutOutcome::Switched { pointer, on_target })
    } else {
        Ok(CheckoutOutcome::Unchanged { on_target })
    }
}
