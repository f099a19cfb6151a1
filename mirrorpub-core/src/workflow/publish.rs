//! Publishing one repository: pull request creation and merge for the document's branch
//!
//! ```text
//! START
//!  -> no local branch           -> Skipped
//!  -> checked out elsewhere     -> SafetyViolation error
//!  -> uncommitted changes       -> UncommittedChanges error
//!  -> no open pull request      -> create one
//!  -> no-merge                  -> Held
//!  -> merge, delete the branch  -> Merged
//! ```

use std::fmt;

use tracing::{info, warn};

use crate::config::Toggles;
use crate::destination::DestinationKind;
use crate::git::{ChangeCheck, RepositoryAdapter};
use crate::session::Session;
use crate::{Error, Result};

/// How publishing one repository ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No local branch: already merged and cleaned up
    Skipped,
    /// Pull request left open
    Held { url: String },
    /// Pull request merged and its branch deleted
    Merged { number: u64, url: String },
    /// Pull request creation and merge were only reported
    DryRun,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Skipped => write!(f, "skipped (no local branch)"),
            PublishOutcome::Held { url } => write!(f, "held open: {}", url),
            PublishOutcome::Merged { number, url } => write!(f, "merged #{}: {}", number, url),
            PublishOutcome::DryRun => write!(f, "dry run"),
        }
    }
}

/// Publish workflow over one repository adapter
#[derive(Debug)]
pub struct PublishWorkflow {
    adapter: RepositoryAdapter,
    toggles: Toggles,
}

impl PublishWorkflow {
    pub fn new(adapter: RepositoryAdapter, toggles: Toggles) -> Self {
        Self { adapter, toggles }
    }

    /// Publish the current document to `kind`'s repository
    pub fn for_destination(session: &Session, kind: DestinationKind) -> Result<Self> {
        let pointer = session.pointer()?;
        Ok(Self::new(
            session.adapter(kind, &pointer.key),
            session.toggles(),
        ))
    }

    pub fn adapter(&self) -> &RepositoryAdapter {
        &self.adapter
    }

    pub fn run(&self) -> Result<PublishOutcome> {
        let repo = self.adapter.label();
        info!(repo = %repo, "Publishing");

        if !self.adapter.branch_exists_local() {
            info!(repo = %repo, "No local branch, nothing to publish");
            return Ok(PublishOutcome::Skipped);
        }

        // pull requests are looked up through the checked-out branch
        self.adapter.ensure_on_target("publish")?;

        match self.adapter.check_changes(self.toggles.ignore_uncommitted)? {
            ChangeCheck::Pending { ahead, changes } => {
                warn!(repo = %repo, ahead, changes, "Uncommitted changes");
                return Err(Error::UncommittedChanges { repo });
            }
            ChangeCheck::Ignored => {
                warn!(repo = %repo, "Ignoring uncommitted changes");
            }
            ChangeCheck::OtherBranch(branch) => {
                info!(repo = %repo, branch = %branch, "Status is of another branch, change check skipped");
            }
            ChangeCheck::Clear => {}
        }

        if self.adapter.has_open_pull_request() {
            info!(repo = %repo, "Pull request already open");
        } else if self.toggles.dry_run {
            info!(repo = %repo, "DRY RUN: skipping pull request creation");
        } else {
            let url = self.adapter.create_pull_request(self.adapter.target_branch())?;
            info!(repo = %repo, url = %url, "Pull request created");
        }

        if self.toggles.dry_run {
            info!(repo = %repo, "DRY RUN: skipping merge");
            return Ok(PublishOutcome::DryRun);
        }

        let pr = self.adapter.current_pull_request().ok_or_else(|| {
            Error::PullRequest(format!("no open pull request found for {}", repo))
        })?;

        if self.toggles.no_merge {
            info!(repo = %repo, url = %pr.url, "Pull request left open");
            return Ok(PublishOutcome::Held { url: pr.url });
        }

        let number = self.adapter.merge_pull_request(Some(pr.number))?;
        info!(repo = %repo, number, "Published");
        Ok(PublishOutcome::Merged {
            number,
            url: pr.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, FakeVcs, TestEnv};

    const KEY: &str = "70525_publish";

    fn publish(env: &TestEnv, toggles: Toggles) -> Result<PublishOutcome> {
        PublishWorkflow::for_destination(&env.session(toggles), DestinationKind::Base)?.run()
    }

    #[test]
    fn test_no_local_branch_is_skipped_without_mutations() {
        let env = TestEnv::new();
        let vcs = FakeVcs::on_branch("main");
        let host = FakeHost::default();
        env.register(DestinationKind::Base, vcs.clone(), host.clone());

        assert_eq!(publish(&env, Toggles::default()).unwrap(), PublishOutcome::Skipped);
        assert!(vcs.mutations().is_empty());
        assert!(host.created().is_empty());
        assert!(host.merged().is_empty());
    }

    #[test]
    fn test_clean_no_merge_is_held_with_url() {
        let env = TestEnv::new();
        let (_, host) = env.repo(DestinationKind::Base);
        let toggles = Toggles {
            no_merge: true,
            ..Default::default()
        };

        assert_eq!(
            publish(&env, toggles).unwrap(),
            PublishOutcome::Held {
                url: "https://github.com/nyosak/pull/1".to_string()
            }
        );
        assert_eq!(host.created().len(), 1);
        assert_eq!(host.created()[0].body, KEY);
        assert!(host.merged().is_empty());
    }

    #[test]
    fn test_clean_publish_merges() {
        let env = TestEnv::new();
        let (_, host) = env.repo(DestinationKind::Base);

        assert!(matches!(
            publish(&env, Toggles::default()).unwrap(),
            PublishOutcome::Merged { number: 1, .. }
        ));
        assert_eq!(host.merged(), vec![1]);
    }

    #[test]
    fn test_existing_pull_request_is_not_recreated() {
        let env = TestEnv::new();
        let (_, host) = env.repo(DestinationKind::Base);
        host.open(7, KEY);

        assert!(matches!(
            publish(&env, Toggles::default()).unwrap(),
            PublishOutcome::Merged { number: 7, .. }
        ));
        assert!(host.created().is_empty());
    }

    #[test]
    fn test_pull_request_of_other_branch_is_not_merged() {
        let env = TestEnv::new();
        let vcs = FakeVcs::on_branch("70601_other").with_local(KEY);
        let host = FakeHost::default();
        host.open(9, "70601_other");
        env.register(DestinationKind::Base, vcs.clone(), host.clone());

        let err = publish(&env, Toggles::default()).unwrap_err();
        assert!(err.is_safety_violation());
        assert!(host.created().is_empty());
        assert!(host.merged().is_empty());
        assert!(vcs.mutations().is_empty());
    }

    #[test]
    fn test_uncommitted_changes_fail() {
        let env = TestEnv::new();
        let vcs = FakeVcs::on_branch(KEY).with_status("## 70525_publish\n M docs/a/70525_publish.md\n");
        let host = FakeHost::default();
        env.register(DestinationKind::Base, vcs, host.clone());

        let err = publish(&env, Toggles::default()).unwrap_err();
        assert!(matches!(err, Error::UncommittedChanges { ref repo } if repo == "article-base-doc:70525_publish"));
        assert!(host.created().is_empty());
    }

    #[test]
    fn test_ignore_uncommitted_proceeds() {
        let env = TestEnv::new();
        let vcs = FakeVcs::on_branch(KEY).with_status("## 70525_publish...origin/70525_publish [ahead 1]\n");
        env.register(DestinationKind::Base, vcs, FakeHost::default());
        let toggles = Toggles {
            ignore_uncommitted: true,
            no_merge: true,
            ..Default::default()
        };

        assert!(matches!(
            publish(&env, toggles).unwrap(),
            PublishOutcome::Held { .. }
        ));
    }

    #[test]
    fn test_dry_run_only_queries() {
        let env = TestEnv::new();
        let (vcs, host) = env.repo(DestinationKind::Base);
        let toggles = Toggles {
            dry_run: true,
            ..Default::default()
        };

        assert_eq!(publish(&env, toggles).unwrap(), PublishOutcome::DryRun);
        assert!(host.created().is_empty());
        assert!(host.merged().is_empty());
        assert!(vcs.mutations().is_empty());
        assert!(vcs.calls().contains(&"status -s -b".to_string()));
    }

    #[test]
    fn test_pull_request_failure_raises() {
        let env = TestEnv::new();
        let (_, host) = env.repo(DestinationKind::Base);
        host.fail("create");

        assert!(matches!(
            publish(&env, Toggles::default()),
            Err(Error::PullRequest(_))
        ));
        assert!(host.merged().is_empty());
    }
}
