//! Running workflows across the base repository and its mirrors
//!
//! Repositories are processed in order and the first error stops the run. Nothing already
//! done in earlier repositories is rolled back.

use tracing::info;

use super::publish::{PublishOutcome, PublishWorkflow};
use super::update::{UpdateReport, UpdateWorkflow};
use crate::destination::DestinationKind;
use crate::session::Session;
use crate::{Error, Result};

/// Publish the current document to `kinds`, in order
pub fn publish_each(
    session: &Session,
    kinds: &[DestinationKind],
) -> Result<Vec<(DestinationKind, PublishOutcome)>> {
    let mut outcomes = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let outcome = PublishWorkflow::for_destination(session, kind)?.run()?;
        info!(destination = %kind, outcome = %outcome, "Publish finished");
        outcomes.push((kind, outcome));
    }
    Ok(outcomes)
}

/// Publish the current document to base, Zenn and Qiita
pub fn publish_all(session: &Session) -> Result<Vec<(DestinationKind, PublishOutcome)>> {
    publish_each(session, &DestinationKind::ALL)
}

/// Result of a publish without preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NolookReport {
    pub updates: Vec<(DestinationKind, UpdateReport)>,
    pub published: Vec<(DestinationKind, PublishOutcome)>,
}

/// Create or refresh every mirror from the base document, then publish all three
pub fn nolook_publish(session: &Session) -> Result<NolookReport> {
    let pointer = session.pointer()?;
    let document = session.layout().document_path(&pointer);
    if !document.is_file() {
        return Err(Error::Resolution(format!(
            "no base document {} for the current key {}",
            document.display(),
            pointer.key
        )));
    }

    let mut updates = Vec::new();
    for kind in DestinationKind::MIRRORS {
        let workflow = UpdateWorkflow::new(session, kind)?;
        let report = if workflow.has_article()? {
            workflow.make_update()?
        } else {
            workflow.make_initial()?
        };
        updates.push((kind, report));
    }

    let published = publish_all(session)?;
    Ok(NolookReport { updates, published })
}
