//! Git integration: ports, the `git` CLI implementation, the safety gate and the adapter

mod adapter;
mod cli;
mod gate;
mod status;
mod vcs;

pub use adapter::{RepositoryAdapter, MAIN_BRANCH, REMOTE};
pub use cli::GitCli;
pub use gate::{ensure_on_target, is_danger};
pub use status::{check_changes, has_pending_changes, ChangeCheck, ShortStatus};
pub use vcs::{NewPullRequest, PrState, PullRequest, PullRequestHost, Vcs};
