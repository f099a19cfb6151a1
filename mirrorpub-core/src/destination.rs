//! Destinations: the base repository and its Zenn and Qiita mirrors
//!
//! Each destination is described by a [`DestinationProfile`] instead of its own workflow type.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::metadata::{ArticleMetadata, DocumentLayout};
use crate::pointer::CurrentPointer;
use crate::{Error, Result};

/// Which repository a profile describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Base,
    Zenn,
    Qiita,
}

impl DestinationKind {
    /// Publication order
    pub const ALL: [DestinationKind; 3] = [
        DestinationKind::Base,
        DestinationKind::Zenn,
        DestinationKind::Qiita,
    ];

    /// Destinations that mirror the base document
    pub const MIRRORS: [DestinationKind; 2] = [DestinationKind::Zenn, DestinationKind::Qiita];

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationKind::Base => "base",
            DestinationKind::Zenn => "zenn",
            DestinationKind::Qiita => "qiita",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DestinationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "base" => Ok(DestinationKind::Base),
            "zenn" => Ok(DestinationKind::Zenn),
            "qiita" => Ok(DestinationKind::Qiita),
            other => Err(Error::Config(format!("unknown destination '{}'", other))),
        }
    }
}

/// How the metadata header of a mirrored article is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTemplate {
    /// Zenn front matter, regenerated from metadata
    Zenn,
    /// Qiita front matter: title and tags from metadata, other keys kept
    Qiita,
}

impl HeadTemplate {
    /// Render the header; `current_head` is the head section of the existing file
    pub fn render(&self, meta: &ArticleMetadata, current_head: &str) -> String {
        match self {
            HeadTemplate::Zenn => zenn_head(meta),
            HeadTemplate::Qiita => qiita_head(meta, current_head),
        }
    }
}

/// Capabilities of one destination repository
#[derive(Debug, Clone)]
pub struct DestinationProfile {
    kind: DestinationKind,
    local_path: PathBuf,
    layout: DocumentLayout,
    generator: Option<Vec<String>>,
    head: Option<HeadTemplate>,
}

impl DestinationProfile {
    /// Profile of `kind` under `config`
    pub fn new(kind: DestinationKind, config: &Config) -> Self {
        let layout = DocumentLayout::new(config.paths.base());
        let (local_path, generator, head) = match kind {
            DestinationKind::Base => (config.paths.base(), None, None),
            DestinationKind::Zenn => (
                config.paths.zenn(),
                Some(config.generators.zenn.clone()),
                Some(HeadTemplate::Zenn),
            ),
            DestinationKind::Qiita => (
                config.paths.qiita(),
                Some(config.generators.qiita.clone()),
                Some(HeadTemplate::Qiita),
            ),
        };

        Self {
            kind,
            local_path,
            layout,
            generator,
            head,
        }
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Local clone of the destination repository
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Directory the destination keeps its articles in
    pub fn articles_dir(&self, pointer: &CurrentPointer) -> PathBuf {
        match self.kind {
            DestinationKind::Base => self.layout.docs().join(&pointer.series),
            DestinationKind::Zenn => self.local_path.join("articles"),
            DestinationKind::Qiita => self.local_path.join("public"),
        }
    }

    /// Article name (file stem) for the current document
    ///
    /// Zenn names are `{key}-{5 digits}`; an existing article is reused, a new name is drawn
    /// otherwise. The drawn name changes on every call until the file exists.
    pub fn article_name(&self, pointer: &CurrentPointer) -> Result<String> {
        match self.kind {
            DestinationKind::Base | DestinationKind::Qiita => Ok(pointer.key.clone()),
            DestinationKind::Zenn => match self.existing_article(pointer)? {
                Some(path) => Ok(path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()),
                None => {
                    let digits: u32 = rand::thread_rng().gen_range(10000..=99999);
                    let name = format!("{}-{}", pointer.key, digits);
                    info!(name = %name, "New Zenn article name generated");
                    Ok(name)
                }
            },
        }
    }

    /// Path of the article named `name`
    pub fn article_path(&self, pointer: &CurrentPointer, name: &str) -> PathBuf {
        self.articles_dir(pointer).join(format!("{}.md", name))
    }

    /// The current document's article in this destination, if it exists
    pub fn existing_article(&self, pointer: &CurrentPointer) -> Result<Option<PathBuf>> {
        match self.kind {
            DestinationKind::Base | DestinationKind::Qiita => {
                let path = self.article_path(pointer, &pointer.key);
                Ok(path.is_file().then_some(path))
            }
            DestinationKind::Zenn => {
                // the clone path may hold glob metacharacters
                let pattern = format!(
                    "{}/{}-*.md",
                    glob::Pattern::escape(&self.articles_dir(pointer).to_string_lossy()),
                    glob::Pattern::escape(&pointer.key)
                );
                let mut found: Vec<PathBuf> = glob::glob(&pattern)
                    .map_err(|e| Error::Config(format!("Invalid pattern {}: {}", pattern, e)))?
                    .filter_map(|entry| entry.ok())
                    .filter(|path| path.is_file())
                    .collect();

                match found.len() {
                    0 => Ok(None),
                    1 => Ok(found.pop()),
                    n => {
                        warn!(key = %pointer.key, ?found, "Multiple Zenn articles");
                        Err(Error::Resolution(format!(
                            "{} Zenn articles found for {}. Remove all but one.",
                            n, pointer.key
                        )))
                    }
                }
            }
        }
    }

    /// Generator command for a new article named `name`
    pub fn generator_command(&self, name: &str) -> Result<Vec<String>> {
        let mut command = self.generator.clone().ok_or_else(|| {
            Error::Config(format!("{} has no article generator", self.kind))
        })?;
        command.push(name.to_string());
        Ok(command)
    }

    /// Header template of mirrored articles
    pub fn head_template(&self) -> Result<HeadTemplate> {
        self.head.ok_or_else(|| {
            Error::Config(format!("{} articles are not generated from the base", self.kind))
        })
    }
}

fn zenn_head(meta: &ArticleMetadata) -> String {
    let topics = meta
        .tags
        .iter()
        .map(|tag| format!("\"{}\"", tag))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "---\ntitle: \"{}\"\ntopics: [{}]\ntype: \"{}\"\nemoji: \"{}\"\npublished: true\n---\n",
        meta.title, topics, meta.kind, meta.emoji
    )
}

fn qiita_head(meta: &ArticleMetadata, current_head: &str) -> String {
    let mut out = format!("---\ntitle: '{}'\ntags:\n", meta.title);
    for tag in &meta.tags {
        out.push_str(&format!("  - {}\n", tag));
    }
    for line in qiita_clean_head(current_head) {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("---\n");
    out
}

/// Head lines Qiita keeps as they are (ids, timestamps, flags)
fn qiita_clean_head(current_head: &str) -> Vec<&str> {
    current_head
        .lines()
        .filter(|line| !is_separator(line))
        .filter(|line| !is_h1(line))
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_yaml_list_item(line))
        .filter(|line| !line.starts_with("title:") && !line.starts_with("tags:"))
        .map(str::trim_end)
        .collect()
}

/// A `---` line between head and body
pub fn is_separator(line: &str) -> bool {
    line.trim_end() == "---"
}

fn is_h1(line: &str) -> bool {
    line.trim_start()
        .strip_prefix('#')
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn is_yaml_list_item(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
        && line
            .trim_start()
            .strip_prefix('-')
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}
