//! The repository adapter: one local clone bound to the current document's branch
//!
//! Identity is derived from the clone's location: `.../{account}/{repo}` pushes to
//! `https://{account}@github.com/{account}/{repo}.git`.
//!
//! Only one workflow may drive a given clone at a time. Nothing here locks the clone; the
//! safety gate only checks which branch is checked out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::gate;
use super::status::{check_changes, ChangeCheck, ShortStatus};
use super::vcs::{NewPullRequest, PullRequest, PullRequestHost, Vcs};
use crate::{Error, Result};

/// Name of the main line in every repository
pub const MAIN_BRANCH: &str = "main";

/// Remote whose tracking branches are looked up
pub const REMOTE: &str = "origin";

/// Primitive version-control operations on one repository, guarded by the safety gate
pub struct RepositoryAdapter {
    root: PathBuf,
    account: String,
    repo: String,
    target: String,
    vcs: Arc<dyn Vcs>,
    host: Arc<dyn PullRequestHost>,
}

impl fmt::Debug for RepositoryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryAdapter")
            .field("root", &self.root)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RepositoryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, branch {})",
            self.repo,
            self.root.display(),
            self.repo_url(),
            self.target
        )
    }
}

impl RepositoryAdapter {
    /// Bind to the clone at `root`, targeting `target_branch`
    ///
    /// Nothing is run; call [`RepositoryAdapter::initialize`] to bring the clone onto the
    /// target branch.
    pub fn new(
        root: impl Into<PathBuf>,
        target_branch: impl Into<String>,
        vcs: Arc<dyn Vcs>,
        host: Arc<dyn PullRequestHost>,
    ) -> Self {
        let root = root.into();
        let basename = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        let repo = basename(Some(root.as_path()));
        let account = basename(root.parent());

        Self {
            root,
            account,
            repo,
            target: target_branch.into(),
            vcs,
            host,
        }
    }

    /// Local clone path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Owner account, the clone's parent directory name
    pub fn account_name(&self) -> &str {
        &self.account
    }

    /// Repository name, the clone's directory name
    pub fn repo_name(&self) -> &str {
        &self.repo
    }

    /// Remote URL used for pull and push
    pub fn repo_url(&self) -> String {
        let prefix = if self.account.is_empty() {
            String::new()
        } else {
            format!("{}@", self.account)
        };
        format!(
            "https://{}github.com/{}/{}.git",
            prefix, self.account, self.repo
        )
    }

    /// The main line
    pub fn main_branch(&self) -> &str {
        MAIN_BRANCH
    }

    /// The document's branch
    pub fn target_branch(&self) -> &str {
        &self.target
    }

    /// `{repo}:{branch}` label for reports
    pub fn label(&self) -> String {
        format!("{}:{}", self.repo, self.target)
    }

    /// Bring the clone onto the target branch
    ///
    /// status, pull main, checkout (creating the branch from main when missing), pull the
    /// target if the remote has it, short status. Every step runs even after a failure; the
    /// result is `false` if any step failed. Never raises.
    pub fn initialize(&self) -> bool {
        info!(repo = %self, "Initializing repository");
        let steps = [
            self.status(),
            self.pull_main(),
            self.checkout(true),
            self.pull(),
            match self.status_short(false) {
                Ok(_) => true,
                Err(e) => self.failed("git status -s", e),
            },
        ];
        steps.iter().all(|ok| *ok)
    }

    /// Long `git status` output
    pub fn long_status(&self) -> Result<String> {
        self.vcs.status()
    }

    /// Log the long status
    pub fn status(&self) -> bool {
        match self.long_status() {
            Ok(out) => {
                info!(repo = %self.repo, "{}", out.trim_end());
                true
            }
            Err(e) => self.failed("git status", e),
        }
    }

    /// Short status, optionally with the branch header
    pub fn status_short(&self, with_branch: bool) -> Result<String> {
        let out = self.vcs.status_short(with_branch)?;
        info!(repo = %self.repo, "{}", out.trim_end());
        Ok(out)
    }

    /// `git diff` or `git diff --cached`
    pub fn diff(&self, cached: bool) -> Result<String> {
        self.vcs.diff(cached)
    }

    /// Pull the main line
    pub fn pull_main(&self) -> bool {
        match self.vcs.pull(&self.repo_url(), MAIN_BRANCH) {
            Ok(()) => true,
            Err(e) => self.failed("git pull main", e),
        }
    }

    /// Pull the target branch if the remote has it
    pub fn pull(&self) -> bool {
        if !self.branch_exists_remote() {
            return true;
        }
        match self.vcs.pull(&self.repo_url(), &self.target) {
            Ok(()) => true,
            Err(e) => self.failed("git pull", e),
        }
    }

    /// Check out the target branch, creating it from main if allowed and missing
    pub fn checkout(&self, create_if_required: bool) -> bool {
        if !self.branch_exists_local() {
            if !create_if_required {
                warn!(branch = %self.target, "Branch does not exist");
                return false;
            }
            warn!(
                branch = %self.target,
                base = MAIN_BRANCH,
                "Branch does not exist locally, creating it from the main line"
            );
            if !self.create_branch() {
                return false;
            }
        }
        match self.vcs.checkout(&self.target) {
            Ok(()) => true,
            Err(e) => self.failed("git checkout", e),
        }
    }

    /// Branch checked out right now
    pub fn current_branch(&self) -> Result<String> {
        self.vcs.current_branch()
    }

    /// Whether writing here would touch a branch other than the target
    pub fn is_danger_here(&self) -> bool {
        match self.vcs.current_branch() {
            Ok(current) if !gate::is_danger(&current, &self.target) => false,
            Ok(current) => {
                warn!(current = %current, target = %self.target, "Current branch is not the target");
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not determine the current branch");
                true
            }
        }
    }

    /// Refuse `operation` unless the clone is checked out on the target branch
    pub fn ensure_on_target(&self, operation: &str) -> Result<()> {
        gate::ensure_on_target(self.vcs.as_ref(), operation, &self.target)
    }

    /// Stage `path`; absolute paths are made repository-relative
    pub fn add(&self, path: &Path) -> Result<bool> {
        gate::ensure_on_target(self.vcs.as_ref(), "git add", &self.target)?;
        let relative = self.relative_path(path);
        Ok(self.report("git add", self.vcs.add(&relative)))
    }

    /// Stage every tracked change (`git add -u`)
    pub fn add_all_tracked(&self) -> Result<bool> {
        gate::ensure_on_target(self.vcs.as_ref(), "git add -u", &self.target)?;
        Ok(self.report("git add -u", self.vcs.add_tracked()))
    }

    /// Commit what is staged
    pub fn commit(&self, message: &str) -> Result<bool> {
        gate::ensure_on_target(self.vcs.as_ref(), "git commit", &self.target)?;
        Ok(self.report("git commit", self.vcs.commit(message)))
    }

    /// Push the target branch to the remote URL
    pub fn push(&self) -> Result<bool> {
        gate::ensure_on_target(self.vcs.as_ref(), "git push", &self.target)?;
        Ok(self.report("git push", self.vcs.push(&self.repo_url(), &self.target)))
    }

    /// Whether the target branch exists locally; `false` if git fails
    pub fn branch_exists_local(&self) -> bool {
        self.vcs.branch_exists(&self.target).unwrap_or_else(|e| {
            warn!(error = %e, "git branch --list failed");
            false
        })
    }

    /// Whether `origin/{target}` is known; `false` if git fails
    pub fn branch_exists_remote(&self) -> bool {
        self.vcs
            .remote_branch_exists(REMOTE, &self.target)
            .unwrap_or_else(|e| {
                warn!(error = %e, "git branch --remote --list failed");
                false
            })
    }

    /// Create the target branch from the main line
    pub fn create_branch(&self) -> bool {
        self.report(
            "git branch",
            self.vcs.create_branch(&self.target, MAIN_BRANCH),
        )
    }

    /// Delete the local target branch, a logged no-op if it does not exist
    pub fn delete_branch(&self) -> bool {
        if !self.branch_exists_local() {
            info!(branch = %self.target, "Branch does not exist, nothing to delete");
            return true;
        }
        self.report("git branch -D", self.vcs.delete_branch(&self.target))
    }

    /// Delete the remote target branch, a logged no-op if it does not exist
    pub fn delete_remote_branch(&self) -> bool {
        if !self.branch_exists_remote() {
            info!(branch = %self.target, "Remote branch does not exist, nothing to delete");
            return true;
        }
        self.report(
            "git push --delete",
            self.vcs.delete_remote_branch(&self.repo_url(), &self.target),
        )
    }

    /// Uncommitted-change check of the target branch
    pub fn check_changes(&self, ignore: bool) -> Result<ChangeCheck> {
        let status = ShortStatus::parse(&self.status_short(true)?)?;
        Ok(check_changes(&status, &self.target, ignore))
    }

    /// Open a pull request from the target branch into main
    pub fn create_pull_request(&self, body: &str) -> Result<String> {
        let request = NewPullRequest {
            title: format!("{} to {}", self.target, MAIN_BRANCH),
            base: MAIN_BRANCH.to_string(),
            head: self.target.clone(),
            body: body.to_string(),
        };
        info!(title = %request.title, "Creating pull request");
        let out = self.host.create(&request)?;
        Ok(out.trim().to_string())
    }

    /// The open pull request from the target branch into main, if any
    ///
    /// A pull request of another branch (the clone is checked out elsewhere) is not the
    /// target's and is ignored.
    pub fn current_pull_request(&self) -> Option<PullRequest> {
        match self.host.current(MAIN_BRANCH) {
            Ok(Some(pr)) if pr.head_ref == self.target => Some(pr),
            Ok(Some(pr)) => {
                warn!(
                    number = pr.number,
                    head = %pr.head_ref,
                    target = %self.target,
                    "Open pull request belongs to another branch, ignored"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to query the current pull request");
                None
            }
        }
    }

    /// Whether an open pull request from the target branch into main exists
    pub fn has_open_pull_request(&self) -> bool {
        self.current_pull_request().is_some()
    }

    /// Merge `number`, or the current pull request, and delete its branch
    pub fn merge_pull_request(&self, number: Option<u64>) -> Result<u64> {
        let number = number
            .or_else(|| self.current_pull_request().map(|pr| pr.number))
            .ok_or_else(|| {
                Error::PullRequest(format!("no pull request to merge for {}", self.label()))
            })?;

        info!(number, "Merging pull request");
        self.host.merge(number)?;
        Ok(number)
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf())
        } else {
            path.to_path_buf()
        }
    }

    fn report(&self, operation: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => self.failed(operation, e),
        }
    }

    fn failed(&self, operation: &str, error: Error) -> bool {
        warn!(repo = %self.repo, operation, error = %error, "Command failed");
        false
    }
}
