//! Creating and refreshing a mirrored article from the base document

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::destination::{is_separator, DestinationKind, DestinationProfile, HeadTemplate};
use crate::generator::{extract_created_name, validate_created};
use crate::git::RepositoryAdapter;
use crate::metadata::ArticleMetadata;
use crate::pointer::CurrentPointer;
use crate::session::Session;
use crate::{Error, Result};

/// Commit message prefix after the generator created the article
pub const NEW_ARTICLE_MESSAGE: &str = "new article: ";

/// Commit message prefix after the article was rewritten from the base
pub const UPDATE_MESSAGE: &str = "update from base: ";

/// Keep the head section of an article: the first line through the second `---` line
///
/// ```text
/// ---            kept
/// title: x       kept
/// ---            kept
/// body           dropped
/// ```
pub fn truncate_to_head(content: &str) -> Result<String> {
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().unwrap_or_default();
    if !is_separator(first) {
        return Err(Error::ContentValidation(format!(
            "broken content, the first line must be a separator: {:?}",
            first
        )));
    }

    let mut head = String::from(first);
    for line in lines {
        head.push_str(line);
        if is_separator(line) {
            if !head.ends_with('\n') {
                head.push('\n');
            }
            return Ok(head);
        }
    }

    Err(Error::ContentValidation(
        "broken content, no 2nd separator".to_string(),
    ))
}

/// Output shown before staging tracked changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub diff: String,
    pub cached: String,
    pub status: String,
    /// Whether `git add -u` ran
    pub staged: bool,
}

/// Show the unstaged and staged diffs and the status, then stage every tracked change
pub fn diff_and_stage(adapter: &RepositoryAdapter, dry_run: bool) -> Result<DiffReport> {
    let mut report = DiffReport {
        diff: adapter.diff(false)?,
        cached: adapter.diff(true)?,
        status: adapter.status_short(true)?,
        staged: false,
    };

    if dry_run {
        info!(repo = %adapter.repo_name(), "DRY RUN: skipping git add -u");
        return Ok(report);
    }

    report.staged = adapter.add_all_tracked()?;
    if report.staged {
        report.status = adapter.status_short(true)?;
    }
    Ok(report)
}

/// What an update produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Article name in the destination
    pub name: String,
    /// Article file
    pub path: PathBuf,
    /// Diffs shown before staging, when git was used
    pub diff: Option<DiffReport>,
    /// Whether every push went through
    pub pushed: bool,
}

/// Update workflow of one mirror destination
pub struct UpdateWorkflow<'a> {
    session: &'a Session,
    profile: DestinationProfile,
    head: HeadTemplate,
    adapter: RepositoryAdapter,
    pointer: CurrentPointer,
    metadata: ArticleMetadata,
    source: PathBuf,
}

impl<'a> UpdateWorkflow<'a> {
    /// Workflow for the current document in `kind`
    pub fn new(session: &'a Session, kind: DestinationKind) -> Result<Self> {
        let profile = session.profile(kind);
        let head = profile.head_template()?;
        let pointer = session.pointer()?;
        let layout = session.layout();
        let metadata = ArticleMetadata::load(&layout.metadata_path(&pointer))?;
        let source = layout.document_path(&pointer);
        let adapter = session.adapter(kind, &pointer.key);

        Ok(Self {
            session,
            profile,
            head,
            adapter,
            pointer,
            metadata,
            source,
        })
    }

    pub fn adapter(&self) -> &RepositoryAdapter {
        &self.adapter
    }

    /// Whether the destination already has the current document's article
    pub fn has_article(&self) -> Result<bool> {
        Ok(self.profile.existing_article(&self.pointer)?.is_some())
    }

    /// Create the article, commit, fill it from the base, commit again
    pub fn make_initial(&self) -> Result<UpdateReport> {
        info!(destination = %self.profile.kind(), key = %self.pointer.key, "Creating article");
        self.prepare();

        let name = self.new_article()?;
        let created = self.commit_and_push(NEW_ARTICLE_MESSAGE, &name)?;
        let diff = self.update_from_base(&name)?;
        let updated = self.commit_and_push(UPDATE_MESSAGE, &name)?;

        Ok(self.report(name, diff, created && updated))
    }

    /// Refill the existing article from the base and commit
    pub fn make_update(&self) -> Result<UpdateReport> {
        info!(destination = %self.profile.kind(), key = %self.pointer.key, "Updating article");
        self.prepare();

        let path = self.profile.existing_article(&self.pointer)?.ok_or_else(|| {
            Error::Resolution(format!(
                "no {} article for {}, create it first",
                self.profile.kind(),
                self.pointer.key
            ))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let diff = self.update_from_base(&name)?;
        let pushed = self.commit_and_push(UPDATE_MESSAGE, &name)?;

        Ok(self.report(name, diff, pushed))
    }

    /// Run the generator and register the new article; returns the article name
    pub fn new_article(&self) -> Result<String> {
        // a new Zenn name is drawn on every call, use this one throughout
        let name = self.profile.article_name(&self.pointer)?;
        let expected = format!("{}.md", name);
        let command = self.profile.generator_command(&name)?;

        let dry_run = self.session.toggles().dry_run;
        let output = if dry_run {
            info!(?command, "DRY RUN: skipping article generation");
            format!("created: {}\n", self.profile.article_path(&self.pointer, &name).display())
        } else {
            self.session
                .generator()
                .run(self.profile.local_path(), &command)?
        };
        debug!(output = %output, "Generator output");

        let created = extract_created_name(&output)?;
        validate_created(&expected, &created)?;

        if dry_run {
            return Ok(name);
        }

        if self.session.toggles().skip_git() {
            info!("git disabled: skipping git add");
        } else if !self.adapter.add(&self.profile.article_path(&self.pointer, &name))? {
            warn!(name = %name, "New article was not staged");
        }

        Ok(name)
    }

    /// Replace everything after the head of article `name` with the base document
    pub fn update_from_base(&self, name: &str) -> Result<Option<DiffReport>> {
        let path = self.profile.article_path(&self.pointer, name);
        let toggles = self.session.toggles();

        if toggles.dry_run {
            info!(path = %path.display(), source = %self.source.display(), "DRY RUN: skipping article rewrite");
            return Ok(None);
        }

        let current = fs::read_to_string(&path)?;
        let head = truncate_to_head(&current)?;
        debug!(head = %head, "Head kept");

        let mut content = self.head.render(&self.metadata, &head);
        debug!(head = %content, "Metadata head written");
        content.push_str(&fs::read_to_string(&self.source)?);
        fs::write(&path, content)?;
        info!(path = %path.display(), "Article updated from the base document");

        if toggles.skip_git() {
            info!("git disabled: skipping git add -u");
            return Ok(None);
        }

        // already tracked since creation
        diff_and_stage(&self.adapter, false).map(Some)
    }

    /// Whether the push went through; `false` when git is disabled
    fn commit_and_push(&self, prefix: &str, name: &str) -> Result<bool> {
        if self.session.toggles().skip_git() {
            info!("git disabled: skipping git commit, push");
            return Ok(false);
        }

        if !self.adapter.commit(&format!("{}{}", prefix, name))? {
            warn!(repo = %self.adapter.repo_name(), "Nothing committed");
        }
        let pushed = self.adapter.push()?;
        if !pushed {
            warn!(repo = %self.adapter.repo_name(), "Push failed");
        }
        Ok(pushed)
    }

    fn prepare(&self) {
        if self.session.toggles().dry_run {
            return;
        }
        if !self.adapter.initialize() {
            warn!(repo = %self.adapter.repo_name(), "Initialization did not complete");
        }
    }

    fn report(&self, name: String, diff: Option<DiffReport>, pushed: bool) -> UpdateReport {
        UpdateReport {
            pushed,
            path: self.profile.article_path(&self.pointer, &name),
            name,
            diff,
        }
    }
}
