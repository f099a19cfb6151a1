//! Workflows over the repository adapters

pub mod aggregate;
pub mod checkout;
pub mod document;
pub mod publish;
pub mod update;

pub use aggregate::{nolook_publish, publish_all, publish_each, NolookReport};
pub use checkout::{checkout, resolve_series, CheckoutOutcome};
pub use document::{add_media, commit_document, new_document, NewDocument, NewDocumentReport};
pub use publish::{PublishOutcome, PublishWorkflow};
pub use update::{diff_and_stage, truncate_to_head, DiffReport, UpdateReport, UpdateWorkflow};
