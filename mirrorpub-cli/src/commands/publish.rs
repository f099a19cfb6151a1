//! Publish commands - pull request creation and merge across the repositories

use clap::{Args, ValueEnum};
use mirrorpub_core::workflow::{nolook_publish, publish_all, publish_each, PublishOutcome};
use mirrorpub_core::{DestinationKind, Session};

use super::mirror::print_report;

/// Which repositories to publish
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTarget {
    Base,
    Zenn,
    Qiita,
    /// Base, Zenn and Qiita, in that order
    All,
}

/// Open and merge the pull request of the current document
#[derive(Args, Debug)]
pub struct PublishArgs {
    #[arg(value_enum)]
    pub target: PublishTarget,
}

impl PublishArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let outcomes = match self.target {
            PublishTarget::Base => publish_each(session, &[DestinationKind::Base])?,
            PublishTarget::Zenn => publish_each(session, &[DestinationKind::Zenn])?,
            PublishTarget::Qiita => publish_each(session, &[DestinationKind::Qiita])?,
            PublishTarget::All => publish_all(session)?,
        };
        print_outcomes(&outcomes);
        Ok(())
    }
}

/// Update both mirrors from the base document and publish all three repositories
#[derive(Args, Debug)]
pub struct NolookArgs {
    /// Confirm publishing without reviewing the mirrors
    #[arg(long)]
    pub publish: bool,
}

impl NolookArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        if !self.publish {
            anyhow::bail!("nolook publishes without preview, pass --publish to confirm");
        }

        let report = nolook_publish(session)?;
        for (kind, update) in &report.updates {
            println!("[{}]", kind);
            print_report(update);
        }
        print_outcomes(&report.published);
        Ok(())
    }
}

fn print_outcomes(outcomes: &[(DestinationKind, PublishOutcome)]) {
    for (kind, outcome) in outcomes {
        println!("{}: {}", kind, outcome);
    }
}
