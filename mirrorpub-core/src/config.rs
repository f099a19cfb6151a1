//! Configuration management for mirrorpub
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (MIRRORPUB_*)
//! 3. Config file (~/.config/mirrorpub/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Local directories of the mirrored repositories and the scratch area
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding all repository clones
    pub doc_home: PathBuf,
    /// Clone of the authoritative document repository
    pub base: Option<PathBuf>,
    /// Clone of the Zenn mirror
    pub zenn: Option<PathBuf>,
    /// Clone of the Qiita mirror
    pub qiita: Option<PathBuf>,
    /// Where the current-document pointer is stored
    pub scratch: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            doc_home: dirs::home_dir().unwrap_or_default().join("doc"),
            base: None,
            zenn: None,
            qiita: None,
            scratch: None,
        }
    }
}

impl PathsConfig {
    /// Path of the authoritative document repository
    pub fn base(&self) -> PathBuf {
        self.base
            .clone()
            .unwrap_or_else(|| self.doc_home.join("article-base-doc"))
    }

    /// Path of the Zenn repository
    pub fn zenn(&self) -> PathBuf {
        self.zenn
            .clone()
            .unwrap_or_else(|| self.doc_home.join("article-zenn-doc"))
    }

    /// Path of the Qiita repository
    pub fn qiita(&self) -> PathBuf {
        self.qiita
            .clone()
            .unwrap_or_else(|| self.doc_home.join("article-qiita-doc"))
    }

    /// Directory of the persisted pointer files
    pub fn scratch(&self) -> PathBuf {
        self.scratch
            .clone()
            .unwrap_or_else(|| self.doc_home.join("article-markdown-tool").join("tmp"))
    }

    /// Documents tree of the base repository
    pub fn docs(&self) -> PathBuf {
        self.base().join("docs")
    }
}

/// External commands that create a new destination article
///
/// The article name is appended as the last argument.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorsConfig {
    /// Generator for Zenn articles
    pub zenn: Vec<String>,
    /// Generator for Qiita articles
    pub qiita: Vec<String>,
}

impl Default for GeneratorsConfig {
    fn default() -> Self {
        Self {
            zenn: ["npx", "zenn", "new:article", "--slug"]
                .map(String::from)
                .to_vec(),
            qiita: ["npx", "qiita", "new"].map(String::from).to_vec(),
        }
    }
}

/// Defaults for a newly initialized document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Series used when neither the flag nor the pointer names one
    pub series: String,
    /// Title placeholder
    pub title: String,
    /// Tags used when no metadata exists yet
    pub tags: String,
    /// Article type
    #[serde(rename = "type")]
    pub kind: String,
    /// Article emoji
    pub emoji: String,
    /// Positive: suggest the N most used tags. Zero: all used tags. Negative: `tags` above.
    pub used_tags_top: i32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            series: "a".to_string(),
            title: "について、とりあえずメモ".to_string(),
            tags: "GitHub Ubuntu".to_string(),
            kind: "tech".to_string(),
            emoji: "🐚".to_string(),
            used_tags_top: 0,
        }
    }
}

/// Operator toggles shared by every workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggles {
    /// Suppress all writes and pull request mutations
    pub dry_run: bool,
    /// Create or keep the pull request open, never merge
    pub no_merge: bool,
    /// Bypass the uncommitted-change refusal
    pub ignore_uncommitted: bool,
    /// Write files but skip staging, commit and push
    pub no_git: bool,
}

impl Toggles {
    /// Whether git writes (add/commit/push) should be skipped
    pub fn skip_git(&self) -> bool {
        self.dry_run || self.no_git
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Repository locations
    pub paths: PathsConfig,
    /// Destination generator commands
    pub generators: GeneratorsConfig,
    /// New document defaults
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/mirrorpub/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mirrorpub").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - MIRRORPUB_DOC_HOME: Directory holding the repository clones
    /// - MIRRORPUB_SCRATCH: Directory of the pointer files
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(doc_home) = std::env::var("MIRRORPUB_DOC_HOME") {
            self.paths.doc_home = PathBuf::from(doc_home);
        }

        if let Ok(scratch) = std::env::var("MIRRORPUB_SCRATCH") {
            self.paths.scratch = Some(PathBuf::from(scratch));
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, doc_home: Option<PathBuf>) -> Self {
        if let Some(path) = doc_home {
            self.paths.doc_home = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(doc_home: Option<PathBuf>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(doc_home))
    }
}
