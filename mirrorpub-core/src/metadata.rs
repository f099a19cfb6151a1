//! Article metadata files and the documents tree layout
//!
//! Metadata lives next to the documents of a series:
//!
//! ```text
//! docs/
//!   a/70525_publish.md          document of series `a`
//!   meta/70525_publish.yaml     metadata (`met` + series)
//!   media/70525_publish_1.png   media (`medi` + series)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pointer::CurrentPointer;
use crate::{Error, Result};

/// Folder prefix of metadata directories
pub const METADATA_PREFIX: &str = "met";

/// Folder prefix of media directories
pub const MEDIA_PREFIX: &str = "medi";

/// Keys written to a new metadata file, in order
pub const METADATA_KEYS: [&str; 4] = ["title", "tags", "type", "emoji"];

/// Parsed metadata of one article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Article title
    pub title: String,
    /// Ordered, de-duplicated tags
    pub tags: Vec<String>,
    /// Article type (e.g. `tech`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Article emoji
    pub emoji: String,
}

impl ArticleMetadata {
    /// Parse `key: value` lines; `tags` accepts a space separated value or list items
    pub fn parse(content: &str) -> Self {
        let mut meta = Self::default();
        let mut in_tags_list = false;

        for line in content.lines() {
            if in_tags_list {
                if let Some(item) = list_item(line) {
                    meta.push_tag(item);
                    continue;
                }
                in_tags_list = false;
            }

            let Some((key, value)) = key_value(line) else {
                continue;
            };

            match key {
                "title" => meta.title = unquote(value).to_string(),
                "type" => meta.kind = unquote(value).to_string(),
                "emoji" => meta.emoji = unquote(value).to_string(),
                "tags" => {
                    if value.is_empty() {
                        in_tags_list = true;
                    }
                    for tag in value.split_whitespace() {
                        meta.push_tag(tag);
                    }
                }
                _ => {}
            }
        }

        meta
    }

    /// Read and parse a metadata file; a missing file yields empty metadata
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "Metadata file not found");
            return Ok(Self::default());
        }
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Render as a metadata file
    pub fn render(&self) -> String {
        let mut out = String::new();
        for key in METADATA_KEYS {
            let value = match key {
                "title" => self.title.clone(),
                "tags" => self.tags.join(" "),
                "type" => self.kind.clone(),
                _ => self.emoji.clone(),
            };
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out
    }

    /// Set tags from a space separated string, keeping first occurrences
    pub fn set_tags(&mut self, tags: &str) {
        self.tags.clear();
        for tag in tags.split_whitespace() {
            self.push_tag(tag);
        }
    }

    fn push_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// `key: value` with a non-empty key at the start of the line
fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    if key.is_empty() || key.starts_with(char::is_whitespace) {
        return None;
    }
    Some((key.trim_end(), value.trim()))
}

/// An indented `- item` line
fn list_item(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix("- ")
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Locations of documents and their companions under the base repository
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    base: PathBuf,
}

impl DocumentLayout {
    /// Layout of the base repository at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base repository root
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The documents tree
    pub fn docs(&self) -> PathBuf {
        self.base.join("docs")
    }

    /// Authoritative source document
    pub fn document_path(&self, pointer: &CurrentPointer) -> PathBuf {
        self.docs()
            .join(&pointer.series)
            .join(format!("{}.md", pointer.key))
    }

    /// Metadata file of the document
    pub fn metadata_path(&self, pointer: &CurrentPointer) -> PathBuf {
        self.docs()
            .join(format!("{}{}", METADATA_PREFIX, pointer.series))
            .join(format!("{}.yaml", pointer.key))
    }

    /// Media folder of the document's series
    pub fn media_dir(&self, pointer: &CurrentPointer) -> PathBuf {
        self.docs()
            .join(format!("{}{}", MEDIA_PREFIX, pointer.series))
    }

    /// Destination of a media file, prefixed with the key unless already prefixed
    pub fn media_path(&self, pointer: &CurrentPointer, file: &Path) -> PathBuf {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let prefix = format!("{}_", pointer.key);
        let name = if file_name.starts_with(&prefix) {
            file_name
        } else {
            format!("{}{}", prefix, file_name)
        };
        self.media_dir(pointer).join(name)
    }

    /// Repository README
    pub fn readme_path(&self) -> PathBuf {
        self.base.join("README.md")
    }

    /// Every metadata file in the documents tree (`met*/*.yaml`)
    pub fn metadata_files(&self) -> Result<Vec<PathBuf>> {
        let docs = glob::Pattern::escape(&self.docs().to_string_lossy());
        let pattern = format!("{}/{}*/*.yaml", docs, METADATA_PREFIX);

        let paths = glob::glob(&pattern)
            .map_err(|e| Error::Config(format!("Invalid metadata pattern {}: {}", pattern, e)))?;

        let mut files: Vec<PathBuf> = paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Every tag used by any document
    ///
    /// With `top > 0` the `top` most used tags, most used first; otherwise all tags
    /// alphabetically.
    pub fn used_tags(&self, top: usize) -> Result<Vec<String>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for file in self.metadata_files()? {
            for tag in ArticleMetadata::load(&file)?.tags {
                *counts.entry(tag).or_default() += 1;
            }
        }

        let mut tags: Vec<(String, usize)> = counts.into_iter().collect();
        if top > 0 {
            tags.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
            tags.truncate(top);
        } else {
            tags.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        Ok(tags.into_iter().map(|(tag, _)| tag).collect())
    }
}

/// `(key, series)` of a metadata file, from its stem and parent folder
pub fn key_and_series(path: &Path) -> Option<(String, String)> {
    let key = path.file_stem()?.to_string_lossy().to_string();
    let folder = path.parent()?.file_name()?.to_string_lossy().to_string();
    let series = folder
        .strip_prefix(METADATA_PREFIX)
        .unwrap_or(&folder)
        .to_string();
    Some((key, series))
}
