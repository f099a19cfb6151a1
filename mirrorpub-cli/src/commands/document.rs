//! Base repository commands: new, commit, add-media

use std::path::PathBuf;

use clap::Args;
use mirrorpub_core::date;
use mirrorpub_core::workflow::{add_media, commit_document, new_document, NewDocument};
use mirrorpub_core::{ArticleMetadata, Session};

/// Start a new document
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Slug of the document, becomes part of the branch name
    pub name: String,

    /// Series folder (defaults to the current document's series)
    #[arg(short, long)]
    pub series: Option<String>,

    /// Document title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Space separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Article type
    #[arg(long = "type")]
    pub kind: Option<String>,

    /// Article emoji
    #[arg(long)]
    pub emoji: Option<String>,

    /// Date token of the key (defaults to today)
    #[arg(long)]
    pub now: Option<String>,
}

impl NewArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let defaults = &session.config().defaults;

        let series = match &self.series {
            Some(series) => series.clone(),
            None => session
                .pointer()
                .map(|p| p.series)
                .unwrap_or_else(|_| defaults.series.clone()),
        };

        let mut metadata = ArticleMetadata {
            title: self.title.clone().unwrap_or_else(|| defaults.title.clone()),
            kind: self.kind.clone().unwrap_or_else(|| defaults.kind.clone()),
            emoji: self.emoji.clone().unwrap_or_else(|| defaults.emoji.clone()),
            ..Default::default()
        };
        metadata.set_tags(self.tags.as_deref().unwrap_or(&defaults.tags));

        if self.tags.is_none() && defaults.used_tags_top >= 0 {
            let top = usize::try_from(defaults.used_tags_top).unwrap_or_default();
            let used = session.layout().used_tags(top)?;
            if !used.is_empty() {
                println!("Used tags: {}", used.join(" "));
            }
        }

        let doc = NewDocument {
            series,
            name: self.name.clone(),
            now: self.now.clone().unwrap_or_else(date::reiwa_now),
            metadata,
        };
        let report = new_document(session, &doc)?;

        print!("{}", report.pointer);
        for file in &report.files {
            println!("  written: {}", file.display());
        }
        Ok(())
    }
}

/// Commit and push the base repository
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Commit message, the document key is appended
    #[arg(short, long, default_value = "update")]
    pub message: String,
}

impl CommitArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        if session.toggles().skip_git() {
            println!("git disabled: nothing committed");
            return Ok(());
        }

        if commit_document(session, &self.message)? {
            println!("Committed and pushed.");
        } else {
            println!("Nothing committed or pushed, see the log above.");
        }
        Ok(())
    }
}

/// Copy media files next to the current document
#[derive(Args, Debug)]
pub struct AddMediaArgs {
    /// Files to add
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl AddMediaArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        for path in add_media(session, &self.files)? {
            println!("  added: {}", path.display());
        }
        Ok(())
    }
}
