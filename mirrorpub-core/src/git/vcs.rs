//! Ports through which the core talks to git and to the pull request platform
//!
//! Production implementations shell out (`GitCli` here, `GhCli` in `mirrorpub-github`);
//! tests substitute recording fakes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Primitive git operations on one repository clone
pub trait Vcs: Send + Sync {
    /// Name of the branch checked out right now
    fn current_branch(&self) -> Result<String>;

    /// Long-form `git status`
    fn status(&self) -> Result<String>;

    /// `git status -s`, with the `## branch` header when `with_branch`
    fn status_short(&self, with_branch: bool) -> Result<String>;

    /// `git diff`, or `git diff --cached`
    fn diff(&self, cached: bool) -> Result<String>;

    /// `git pull <url> <branch>`
    fn pull(&self, url: &str, branch: &str) -> Result<()>;

    /// `git checkout <branch>`
    fn checkout(&self, branch: &str) -> Result<()>;

    /// `git add <path>` with a repository-relative path
    fn add(&self, path: &Path) -> Result<()>;

    /// `git add -u`
    fn add_tracked(&self) -> Result<()>;

    /// `git commit -m <message>`
    fn commit(&self, message: &str) -> Result<()>;

    /// `git push -u <url> <branch>`
    fn push(&self, url: &str, branch: &str) -> Result<()>;

    /// Whether a local branch exists
    fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Whether `<remote>/<branch>` is known locally
    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool>;

    /// `git branch <branch> <base>`
    fn create_branch(&self, branch: &str, base: &str) -> Result<()>;

    /// `git branch -D <branch>`
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// `git push <url> --delete <branch>`
    fn delete_remote_branch(&self, url: &str, branch: &str) -> Result<()>;
}

/// Pull request operations of the hosting platform for one repository clone
pub trait PullRequestHost: Send + Sync {
    /// Open a pull request, returning the platform's output (the PR URL)
    fn create(&self, request: &NewPullRequest) -> Result<String>;

    /// The open pull request of the checked-out branch targeting `base`
    fn current(&self, base: &str) -> Result<Option<PullRequest>>;

    /// Merge with a merge commit and delete the head branch
    fn merge(&self, number: u64) -> Result<()>;
}

/// Parameters of a pull request to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub base: String,
    pub head: String,
    pub body: String,
}

/// PR state as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// Pull request representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    /// Platform node id
    #[serde(default)]
    pub id: String,
    /// PR number
    pub number: u64,
    /// Web URL
    pub url: String,
    /// Current state
    pub state: PrState,
    /// Whether the PR is closed
    #[serde(default)]
    pub closed: bool,
    /// Base branch name
    #[serde(rename = "baseRefName")]
    pub base_ref: String,
    /// Head branch name
    #[serde(rename = "headRefName")]
    pub head_ref: String,
}
