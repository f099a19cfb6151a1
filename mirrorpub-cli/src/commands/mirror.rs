//! Mirror commands: init and update of the Zenn and Qiita articles

use clap::Args;
use mirrorpub_core::workflow::{UpdateReport, UpdateWorkflow};
use mirrorpub_core::{DestinationKind, Session};

use super::inspect::print_diff;

/// Create the mirror article of the current document
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Mirror to create the article in (zenn or qiita)
    pub dest: DestinationKind,
}

impl InitArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let workflow = UpdateWorkflow::new(session, self.dest)?;
        if workflow.has_article()? {
            anyhow::bail!(
                "{} already has an article for this document, use `mirrorpub update {}`",
                self.dest,
                self.dest
            );
        }
        print_report(&workflow.make_initial()?);
        Ok(())
    }
}

/// Refresh the mirror article from the base document
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Mirror to update (zenn or qiita)
    pub dest: DestinationKind,
}

impl UpdateArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let workflow = UpdateWorkflow::new(session, self.dest)?;
        print_report(&workflow.make_update()?);
        Ok(())
    }
}

pub(crate) fn print_report(report: &UpdateReport) {
    if let Some(diff) = &report.diff {
        print_diff(diff);
    }
    println!("{}: {}", report.name, report.path.display());
    if !report.pushed {
        println!("Not pushed, push the mirror before publishing.");
    }
}
