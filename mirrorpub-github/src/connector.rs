//! Production wiring of the core ports

use std::path::Path;
use std::sync::Arc;

use mirrorpub_core::{Connector, GitCli, PullRequestHost, Vcs};

use crate::GhCli;

/// Opens `git` and `gh` on a repository clone
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubConnector;

impl Connector for GitHubConnector {
    fn vcs(&self, root: &Path) -> Arc<dyn Vcs> {
        Arc::new(GitCli::new(root))
    }

    fn host(&self, root: &Path) -> Arc<dyn PullRequestHost> {
        Arc::new(GhCli::new(root))
    }
}
