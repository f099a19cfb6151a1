//! Read-mostly commands: diff, status, tags, current

use chrono::Local;
use clap::Args;
use mirrorpub_core::date;
use mirrorpub_core::workflow::{diff_and_stage, DiffReport};
use mirrorpub_core::{DestinationKind, Session};

/// Show diffs of a repository and stage its tracked changes
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Repository to diff
    #[arg(short, long, default_value = "base")]
    pub dest: DestinationKind,
}

impl DiffArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let pointer = session.pointer()?;
        let adapter = session.adapter(self.dest, &pointer.key);
        let report = diff_and_stage(&adapter, session.toggles().skip_git())?;
        print_diff(&report);
        Ok(())
    }
}

pub(crate) fn print_diff(report: &DiffReport) {
    for section in [&report.diff, &report.cached, &report.status] {
        if !section.is_empty() {
            println!("{}", section);
        }
    }
    if report.staged {
        println!("Tracked changes staged.");
    }
}

/// Show git status of the repositories
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base repository
    #[arg(long)]
    pub base: bool,

    /// Zenn repository
    #[arg(long)]
    pub zenn: bool,

    /// Qiita repository
    #[arg(long)]
    pub qiita: bool,
}

impl StatusArgs {
    /// Selected repositories; none selected means all
    pub fn selected(&self) -> Vec<DestinationKind> {
        let picked: Vec<DestinationKind> = [
            (self.base, DestinationKind::Base),
            (self.zenn, DestinationKind::Zenn),
            (self.qiita, DestinationKind::Qiita),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect();

        if picked.is_empty() {
            DestinationKind::ALL.to_vec()
        } else {
            picked
        }
    }

    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let branch = session.pointer().map(|p| p.key).unwrap_or_default();
        for kind in self.selected() {
            let adapter = session.adapter(kind, &branch);
            println!("[{}] {}", kind, adapter.root().display());
            println!("{}", adapter.long_status()?);
        }
        Ok(())
    }
}

/// List tags used by the documents
#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Only the N most used tags (0 lists all, alphabetically)
    #[arg(long)]
    pub top: Option<usize>,
}

impl TagsArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let top = self.top.unwrap_or_else(|| {
            usize::try_from(session.config().defaults.used_tags_top).unwrap_or_default()
        });
        println!("{}", session.layout().used_tags(top)?.join(" "));
        Ok(())
    }
}

/// Show the current document
#[derive(Args, Debug)]
pub struct CurrentArgs {}

impl CurrentArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let pointer = session.pointer()?;
        print!("{}", pointer);
        match date::days_since(&pointer.now, Local::now().date_naive()) {
            Ok(days) => println!("started {} days ago", days),
            Err(e) => tracing::debug!(error = %e, "No date in the key"),
        }
        println!("document: {}", session.layout().document_path(&pointer).display());
        Ok(())
    }
}
