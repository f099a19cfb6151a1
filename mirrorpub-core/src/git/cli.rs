//! `git` command line implementation of [`Vcs`]
//!
//! Mutating operations go through the git CLI so hooks and credential helpers apply;
//! the current branch is read through libgit2.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use tracing::debug;

use super::vcs::Vcs;
use crate::{Error, Result};

/// Runs git subcommands inside one repository clone
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Bind to the repository at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if the given path is a git repository
    pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
        Repository::open(path.as_ref()).is_ok()
    }

    /// Execute a git command and return stdout
    fn run_git(&self, args: &[&str]) -> Result<String> {
        debug!(?args, cwd = %self.root.display(), "Running git command");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Other(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(Error::command("git", args, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(stdout = %stdout.trim_end(), "git finished");
        Ok(stdout)
    }

    fn run_git_silent(&self, args: &[&str]) -> Result<()> {
        self.run_git(args).map(|_| ())
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String> {
        let repo = Repository::open(&self.root).map_err(|e| {
            Error::Config(format!("Not a git repository: {}: {}", self.root.display(), e))
        })?;

        let head = repo
            .head()
            .map_err(|e| Error::Other(format!("Failed to get HEAD: {}", e)))?;

        if !head.is_branch() {
            return Err(Error::Other("HEAD is detached".to_string()));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| Error::Other("HEAD ref does not have a name".to_string()))
    }

    fn status(&self) -> Result<String> {
        self.run_git(&["status"])
    }

    fn status_short(&self, with_branch: bool) -> Result<String> {
        if with_branch {
            self.run_git(&["status", "-s", "-b"])
        } else {
            self.run_git(&["status", "-s"])
        }
    }

    fn diff(&self, cached: bool) -> Result<String> {
        if cached {
            self.run_git(&["diff", "--cached"])
        } else {
            self.run_git(&["diff"])
        }
    }

    fn pull(&self, url: &str, branch: &str) -> Result<()> {
        self.run_git_silent(&["pull", url, branch])
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run_git_silent(&["checkout", branch])
    }

    fn add(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_git_silent(&["add", &path])
    }

    fn add_tracked(&self) -> Result<()> {
        self.run_git_silent(&["add", "-u"])
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git_silent(&["commit", "-m", message])
    }

    fn push(&self, url: &str, branch: &str) -> Result<()> {
        self.run_git_silent(&["push", "-u", url, branch])
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.run_git(&["branch", "--list", branch])?;
        Ok(!output.trim().is_empty())
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        let remote_branch = format!("{}/{}", remote, branch);
        let output = self.run_git(&["branch", "--remote", "--list", &remote_branch])?;
        Ok(!output.trim().is_empty())
    }

    fn create_branch(&self, branch: &str, base: &str) -> Result<()> {
        self.run_git_silent(&["branch", branch, base])
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run_git_silent(&["branch", "-D", branch])
    }

    fn delete_remote_branch(&self, url: &str, branch: &str) -> Result<()> {
        self.run_git_silent(&["push", url, "--delete", branch])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A repository with one commit on `main`, or `None` when git is unavailable
    fn init_repo() -> Option<TempDir> {
        let dir = TempDir::new().unwrap();
        let ok = git(dir.path(), &["init", "-q", "-b", "main"])
            && git(dir.path(), &["config", "user.email", "test@example.com"])
            && git(dir.path(), &["config", "user.name", "Test"])
            && git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "init"]);
        ok.then_some(dir)
    }

    #[test]
    fn test_is_git_repo_negative() {
        let dir = TempDir::new().unwrap();
        assert!(!GitCli::is_git_repo(dir.path()));
    }

    #[test]
    fn test_branch_lifecycle() {
        let Some(dir) = init_repo() else { return };
        let cli = GitCli::new(dir.path());

        assert_eq!(cli.current_branch().unwrap(), "main");
        assert!(!cli.branch_exists("70525_publish").unwrap());

        cli.create_branch("70525_publish", "main").unwrap();
        assert!(cli.branch_exists("70525_publish").unwrap());
        assert!(!cli.remote_branch_exists("origin", "70525_publish").unwrap());

        cli.checkout("70525_publish").unwrap();
        assert_eq!(cli.current_branch().unwrap(), "70525_publish");

        cli.checkout("main").unwrap();
        cli.delete_branch("70525_publish").unwrap();
        assert!(!cli.branch_exists("70525_publish").unwrap());
    }

    #[test]
    fn test_add_commit_and_status() {
        let Some(dir) = init_repo() else { return };
        let cli = GitCli::new(dir.path());

        std::fs::write(dir.path().join("a.md"), "---\n").unwrap();
        let status = cli.status_short(true).unwrap();
        assert!(status.starts_with("## main"));
        assert!(status.contains("?? a.md"));

        cli.add(Path::new("a.md")).unwrap();
        cli.commit("add a").unwrap();
        assert_eq!(cli.status_short(false).unwrap().trim(), "");
    }

    #[test]
    fn test_failure_carries_stderr() {
        let Some(dir) = init_repo() else { return };
        let cli = GitCli::new(dir.path());

        let err = cli.checkout("does-not-exist").unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
        assert!(err.to_string().contains("git checkout does-not-exist"));
    }
}
