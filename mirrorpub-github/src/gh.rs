//! GitHub CLI (`gh`) wrapper for pull request operations
//!
//! `gh` resolves the repository from the clone it runs in, so every call is made with the
//! clone as working directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use mirrorpub_core::git::{NewPullRequest, PullRequest, PullRequestHost};
use tracing::{debug, info};

use crate::{Error, Result};

/// Fields requested from `gh pr status`
const PR_FIELDS: &str = "id,number,url,state,closed,baseRefName,headRefName";

/// GitHub CLI bound to one repository clone
#[derive(Debug, Clone)]
pub struct GhCli {
    root: PathBuf,
}

impl GhCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository clone gh runs in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if gh CLI is installed
    pub fn is_installed() -> bool {
        Command::new("gh")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute a gh command and return stdout
    fn run_gh(&self, args: &[&str]) -> Result<String> {
        debug!(?args, cwd = %self.root.display(), "Running gh command");

        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if !output.status.success() {
            return Err(Error::Gh {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Open a pull request; returns the URL gh prints
    pub fn create_pull_request(&self, request: &NewPullRequest) -> Result<String> {
        let args = create_args(request);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let url = self.run_gh(&args)?;
        info!(url = %url, "Pull request created");
        Ok(url)
    }

    /// The open pull request of the checked-out branch into `base`
    pub fn current_pull_request(&self, base: &str) -> Result<Option<PullRequest>> {
        let filter = current_filter(base);
        let output = self.run_gh(&["pr", "status", "--jq", &filter, "--json", PR_FIELDS])?;
        parse_current(&output)
    }

    /// Merge with a merge commit and delete the head branch
    pub fn merge_pull_request(&self, number: u64) -> Result<()> {
        let number = number.to_string();
        self.run_gh(&["pr", "merge", &number, "--merge", "--delete-branch"])?;
        info!(number = %number, "Pull request merged");
        Ok(())
    }
}

impl PullRequestHost for GhCli {
    fn create(&self, request: &NewPullRequest) -> mirrorpub_core::Result<String> {
        Ok(self.create_pull_request(request)?)
    }

    fn current(&self, base: &str) -> mirrorpub_core::Result<Option<PullRequest>> {
        Ok(self.current_pull_request(base)?)
    }

    fn merge(&self, number: u64) -> mirrorpub_core::Result<()> {
        Ok(self.merge_pull_request(number)?)
    }
}

fn create_args(request: &NewPullRequest) -> Vec<String> {
    [
        "pr",
        "create",
        "--title",
        request.title.as_str(),
        "--base",
        request.base.as_str(),
        "--head",
        request.head.as_str(),
        "--body",
        request.body.as_str(),
    ]
    .map(String::from)
    .to_vec()
}

/// jq filter selecting the current branch's open pull request into `base`
fn current_filter(base: &str) -> String {
    format!(
        ".currentBranch | select(.baseRefName==\"{}\" and .state==\"OPEN\")",
        base
    )
}

/// An empty answer means no open pull request
fn parse_current(output: &str) -> Result<Option<PullRequest>> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(output)?))
}
