//! The session threaded through every workflow
//!
//! Bundles configuration, operator toggles, the pointer store and the factories of the
//! subprocess ports. Nothing in here is global.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, Toggles};
use crate::destination::{DestinationKind, DestinationProfile};
use crate::generator::Generator;
use crate::git::{PullRequestHost, RepositoryAdapter, Vcs};
use crate::metadata::DocumentLayout;
use crate::pointer::{CurrentPointer, PointerStore};
use crate::Result;

/// Opens the version-control and pull request ports of a repository clone
pub trait Connector: Send + Sync {
    fn vcs(&self, root: &Path) -> Arc<dyn Vcs>;

    fn host(&self, root: &Path) -> Arc<dyn PullRequestHost>;
}

/// Everything a workflow needs besides its own arguments
#[derive(Clone)]
pub struct Session {
    config: Config,
    toggles: Toggles,
    store: Arc<dyn PointerStore>,
    connector: Arc<dyn Connector>,
    generator: Arc<dyn Generator>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("toggles", &self.toggles)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        config: Config,
        toggles: Toggles,
        store: Arc<dyn PointerStore>,
        connector: Arc<dyn Connector>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            toggles,
            store,
            connector,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn store(&self) -> &dyn PointerStore {
        self.store.as_ref()
    }

    pub fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    /// The persisted current document
    pub fn pointer(&self) -> Result<CurrentPointer> {
        CurrentPointer::load(self.store.as_ref())
    }

    /// Layout of the base repository
    pub fn layout(&self) -> DocumentLayout {
        DocumentLayout::new(self.config.paths.base())
    }

    pub fn profile(&self, kind: DestinationKind) -> DestinationProfile {
        DestinationProfile::new(kind, &self.config)
    }

    /// Adapter of `kind`'s repository targeting `branch`, not initialized
    pub fn adapter(&self, kind: DestinationKind, branch: &str) -> RepositoryAdapter {
        self.adapter_at(self.profile(kind).local_path(), branch)
    }

    /// Adapter of the clone at `root` targeting `branch`, not initialized
    pub fn adapter_at(&self, root: &Path, branch: &str) -> RepositoryAdapter {
        RepositoryAdapter::new(
            root,
            branch,
            self.connector.vcs(root),
            self.connector.host(root),
        )
    }
}
