//! Base repository chores: starting a document, adding media, committing

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::destination::DestinationKind;
use crate::git::RepositoryAdapter;
use crate::metadata::ArticleMetadata;
use crate::pointer::CurrentPointer;
use crate::session::Session;
use crate::{Error, Result};

/// README line after which new documents are linked
pub const README_MARKER: &str = "<!-- ARTICLES DESCENDANT -->";

/// Parameters of a new document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub series: String,
    pub name: String,
    /// Date token of the key
    pub now: String,
    pub metadata: ArticleMetadata,
}

/// Files written for a new document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocumentReport {
    pub pointer: CurrentPointer,
    pub files: Vec<PathBuf>,
}

/// Body of a new document
pub fn document_template(title: &str) -> String {
    format!(
        "# {}\n\n---\n\n# 🌒️ 序\n\n# 🌕️ 破\n\n# 🌖️ 急\n\n",
        title
    )
}

/// `readme` with a link to `relative` inserted after the marker line, if there is one
pub fn link_in_readme(readme: &str, title: &str, relative: &Path) -> Option<String> {
    let link = format!("- [{}]({})\n", title, relative.display());
    let mut lines: Vec<&str> = readme.split_inclusive('\n').collect();
    let marker = lines
        .iter()
        .position(|line| line.trim_end() == README_MARKER)?;

    lines.insert(marker + 1, link.as_str());
    Some(lines.concat())
}

/// Start a document: pointer, metadata, template, README link, commit and push
///
/// An existing document is never overwritten.
pub fn new_document(session: &Session, doc: &NewDocument) -> Result<NewDocumentReport> {
    let pointer = CurrentPointer::new(&doc.series, &doc.now, &doc.name);
    let layout = session.layout();
    let toggles = session.toggles();

    let document = layout.document_path(&pointer);
    let metadata = layout.metadata_path(&pointer);
    if document.exists() {
        return Err(Error::Resolution(format!(
            "{} already exists, use checkout to resume it",
            document.display()
        )));
    }

    if toggles.dry_run {
        info!(key = %pointer.key, document = %document.display(), "DRY RUN: nothing written");
        return Ok(NewDocumentReport {
            pointer,
            files: Vec::new(),
        });
    }

    pointer.save(session.store())?;
    info!(key = %pointer.key, series = %pointer.series, "Current document set");

    let adapter = session.adapter(DestinationKind::Base, &pointer.key);
    if !adapter.initialize() {
        warn!(repo = %adapter.repo_name(), "Initialization did not complete");
    }

    let mut files = Vec::new();
    write_file(&metadata, &doc.metadata.render())?;
    files.push(metadata);
    write_file(&document, &document_template(&doc.metadata.title))?;
    files.push(document.clone());

    let readme = layout.readme_path();
    if readme.is_file() {
        let relative = document
            .strip_prefix(layout.base())
            .unwrap_or(document.as_path());
        match link_in_readme(&fs::read_to_string(&readme)?, &doc.metadata.title, relative) {
            Some(content) => {
                fs::write(&readme, content)?;
                files.push(readme);
            }
            None => info!("README has no article marker, not linked"),
        }
    }

    if toggles.skip_git() {
        info!("git disabled: skipping git add, commit, push");
        return Ok(NewDocumentReport { pointer, files });
    }

    for file in &files {
        if !adapter.add(file)? {
            warn!(file = %file.display(), "Not staged");
        }
    }
    commit_and_push(&adapter, &format!("initialize {}", pointer.name))?;

    Ok(NewDocumentReport { pointer, files })
}

/// Copy media files next to the current document and stage them
///
/// Files are renamed `{key}_{file}` unless already prefixed; a file already in place is
/// only staged.
pub fn add_media(session: &Session, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let pointer = session.pointer()?;
    let layout = session.layout();
    let toggles = session.toggles();
    let adapter = session.adapter(DestinationKind::Base, &pointer.key);

    if toggles.dry_run {
        for file in files {
            info!(from = %file.display(), to = %layout.media_path(&pointer, file).display(), "DRY RUN: skipping copy");
        }
        return Ok(Vec::new());
    }

    if !adapter.initialize() {
        warn!(repo = %adapter.repo_name(), "Initialization did not complete");
    }

    let mut added = Vec::new();
    for file in files {
        let dest = layout.media_path(&pointer, file);
        if same_file(file, &dest) {
            info!(file = %dest.display(), "Already in place");
        } else {
            if let Some(dir) = dest.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::copy(file, &dest)?;
            info!(from = %file.display(), to = %dest.display(), "Copied");
        }

        if !toggles.skip_git() && !adapter.add(&dest)? {
            warn!(file = %dest.display(), "Not staged");
        }
        added.push(dest);
    }

    Ok(added)
}

/// Commit `"{message} {key}"` on the base repository and push
pub fn commit_document(session: &Session, message: &str) -> Result<bool> {
    let pointer = session.pointer()?;
    let adapter = session.adapter(DestinationKind::Base, &pointer.key);
    commit_and_push(&adapter, &format!("{} {}", message, pointer.key))
}

fn commit_and_push(adapter: &RepositoryAdapter, message: &str) -> Result<bool> {
    let committed = adapter.commit(message)?;
    if !committed {
        warn!(repo = %adapter.repo_name(), "Nothing committed");
    }
    let pushed = adapter.push()?;
    Ok(committed && pushed)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, content)?;
    info!(path = %path.display(), "Written");
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
