//! Recording fakes of the ports, for unit tests

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::TempDir;

use crate::config::{Config, Toggles};
use crate::destination::DestinationKind;
use crate::generator::Generator;
use crate::git::{NewPullRequest, PrState, PullRequest, PullRequestHost, Vcs, MAIN_BRANCH};
use crate::pointer::{CurrentPointer, MemoryPointerStore};
use crate::session::{Connector, Session};
use crate::{Error, Result};

fn simulated(op: &str) -> Error {
    Error::Command {
        command: op.to_string(),
        stderr: "simulated failure".to_string(),
    }
}

#[derive(Debug, Default)]
struct VcsState {
    current: String,
    local: BTreeSet<String>,
    remote: BTreeSet<String>,
    status: Option<String>,
    failing: HashSet<String>,
    calls: Vec<String>,
}

/// In-memory repository that records every command except branch lookups
#[derive(Debug, Clone, Default)]
pub struct FakeVcs {
    state: Arc<Mutex<VcsState>>,
}

impl FakeVcs {
    /// A repository with `main` and `branch`, checked out on `branch`
    pub fn on_branch(branch: &str) -> Self {
        let vcs = Self::default();
        {
            let mut state = vcs.state();
            state.current = branch.to_string();
            state.local.insert(MAIN_BRANCH.to_string());
            state.local.insert(branch.to_string());
        }
        vcs
    }

    pub fn with_local(self, branch: &str) -> Self {
        self.state().local.insert(branch.to_string());
        self
    }

    pub fn with_remote(self, branch: &str) -> Self {
        self.state().remote.insert(branch.to_string());
        self
    }

    /// Raw `git status -s -b` output
    pub fn with_status(self, status: &str) -> Self {
        self.state().status = Some(status.to_string());
        self
    }

    /// Make every later call of `op` (a `Vcs` method name) fail
    pub fn fail(&self, op: &str) {
        self.state().failing.insert(op.to_string());
    }

    pub fn current(&self) -> String {
        self.state().current.clone()
    }

    pub fn has_local(&self, branch: &str) -> bool {
        self.state().local.contains(branch)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Recorded add, commit and push calls
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("add") || c.starts_with("commit") || c.starts_with("push"))
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, VcsState> {
        self.state.lock().unwrap()
    }

    fn record(&self, op: &str, call: String) -> Result<()> {
        let mut state = self.state();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(simulated(op));
        }
        Ok(())
    }

    /// State for a lookup that is not recorded
    fn lookup(&self, op: &str) -> Result<MutexGuard<'_, VcsState>> {
        let state = self.state();
        if state.failing.contains(op) {
            return Err(simulated(op));
        }
        Ok(state)
    }
}

impl Vcs for FakeVcs {
    fn current_branch(&self) -> Result<String> {
        Ok(self.lookup("current_branch")?.current.clone())
    }

    fn status(&self) -> Result<String> {
        self.record("status", "status".to_string())?;
        Ok(format!("On branch {}\n", self.current()))
    }

    fn status_short(&self, with_branch: bool) -> Result<String> {
        let call = if with_branch { "status -s -b" } else { "status -s" };
        self.record("status_short", call.to_string())?;
        let state = self.state();
        let full = state
            .status
            .clone()
            .unwrap_or_else(|| format!("## {}\n", state.current));
        if with_branch {
            Ok(full)
        } else {
            Ok(full.lines().skip(1).map(|l| format!("{}\n", l)).collect())
        }
    }

    fn diff(&self, cached: bool) -> Result<String> {
        let call = if cached { "diff --cached" } else { "diff" };
        self.record("diff", call.to_string())?;
        Ok(String::new())
    }

    fn pull(&self, url: &str, branch: &str) -> Result<()> {
        self.record("pull", format!("pull {} {}", url, branch))?;
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record("checkout", format!("checkout {}", branch))?;
        let mut state = self.state();
        if !state.local.contains(branch) {
            return Err(simulated("checkout"));
        }
        state.current = branch.to_string();
        Ok(())
    }

    fn add(&self, path: &Path) -> Result<()> {
        self.record("add", format!("add {}", path.display()))?;
        Ok(())
    }

    fn add_tracked(&self) -> Result<()> {
        self.record("add_tracked", "add -u".to_string())?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record("commit", format!("commit {}", message))?;
        Ok(())
    }

    fn push(&self, url: &str, branch: &str) -> Result<()> {
        self.record("push", format!("push {} {}", url, branch))?;
        Ok(())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.lookup("branch_exists")?.local.contains(branch))
    }

    fn remote_branch_exists(&self, _remote: &str, branch: &str) -> Result<bool> {
        Ok(self.lookup("remote_branch_exists")?.remote.contains(branch))
    }

    fn create_branch(&self, branch: &str, base: &str) -> Result<()> {
        self.record("create_branch", format!("branch {} {}", branch, base))?;
        self.state().local.insert(branch.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record("delete_branch", format!("branch -D {}", branch))?;
        self.state().local.remove(branch);
        Ok(())
    }

    fn delete_remote_branch(&self, url: &str, branch: &str) -> Result<()> {
        self.record(
            "delete_remote_branch",
            format!("push {} --delete {}", url, branch),
        )?;
        self.state().remote.remove(branch);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct HostState {
    open: Option<PullRequest>,
    created: Vec<NewPullRequest>,
    merged: Vec<u64>,
    failing: HashSet<String>,
}

/// Pull request platform that keeps at most one open pull request
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    /// Open pull request `number` from `head` into main
    pub fn open(&self, number: u64, head: &str) {
        self.state().open = Some(pull_request(number, head));
    }

    /// Make every later call of `op` (`create`, `current` or `merge`) fail
    pub fn fail(&self, op: &str) {
        self.state().failing.insert(op.to_string());
    }

    pub fn created(&self) -> Vec<NewPullRequest> {
        self.state().created.clone()
    }

    pub fn merged(&self) -> Vec<u64> {
        self.state().merged.clone()
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    fn check(&self, op: &str) -> Result<MutexGuard<'_, HostState>> {
        let state = self.state();
        if state.failing.contains(op) {
            return Err(Error::PullRequest(format!("{} failed", op)));
        }
        Ok(state)
    }
}

fn pull_request(number: u64, head: &str) -> PullRequest {
    PullRequest {
        id: format!("PR_{}", number),
        number,
        url: format!("https://github.com/nyosak/pull/{}", number),
        state: PrState::Open,
        closed: false,
        base_ref: MAIN_BRANCH.to_string(),
        head_ref: head.to_string(),
    }
}

impl PullRequestHost for FakeHost {
    fn create(&self, request: &NewPullRequest) -> Result<String> {
        let mut state = self.check("create")?;
        state.created.push(request.clone());
        let pr = pull_request(state.created.len() as u64, &request.head);
        let url = pr.url.clone();
        state.open = Some(pr);
        Ok(format!("{}\n", url))
    }

    fn current(&self, base: &str) -> Result<Option<PullRequest>> {
        let state = self.check("current")?;
        Ok(state.open.clone().filter(|pr| pr.base_ref == base))
    }

    fn merge(&self, number: u64) -> Result<()> {
        let mut state = self.check("merge")?;
        state.merged.push(number);
        state.open = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct GeneratorState {
    targets: HashMap<PathBuf, (String, String)>,
    calls: Vec<Vec<String>>,
}

/// Generator that creates `{cwd}/{dir}/{name}.md` and reports it the way the real CLIs do
///
/// Run in an unknown directory it prints a banner without a `created:` line.
#[derive(Debug, Clone, Default)]
pub struct FakeGenerator {
    state: Arc<Mutex<GeneratorState>>,
}

impl FakeGenerator {
    /// Run in `cwd`, create `{dir}/{last argument}.md` containing `head`
    pub fn creating(self, cwd: &Path, dir: &str, head: &str) -> Self {
        self.state()
            .targets
            .insert(cwd.to_path_buf(), (dir.to_string(), head.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, GeneratorState> {
        self.state.lock().unwrap()
    }
}

impl Generator for FakeGenerator {
    fn run(&self, cwd: &Path, command: &[String]) -> Result<String> {
        let mut state = self.state();
        state.calls.push(command.to_vec());

        let Some((dir, head)) = state.targets.get(cwd).cloned() else {
            return Ok("New version available\n".to_string());
        };

        let name = command.last().cloned().unwrap_or_default();
        std::fs::create_dir_all(cwd.join(&dir))?;
        std::fs::write(cwd.join(&dir).join(format!("{}.md", name)), head)?;

        Ok(format!(
            "npm notice\ncreated: \x1b[32m{}/{}.md\x1b[39m\n",
            dir, name
        ))
    }
}

/// Hands out the registered fakes of each repository clone
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    repos: Arc<Mutex<HashMap<PathBuf, (FakeVcs, FakeHost)>>>,
}

impl FakeConnector {
    pub fn register(&self, root: &Path, vcs: FakeVcs, host: FakeHost) {
        self.repos
            .lock()
            .unwrap()
            .insert(root.to_path_buf(), (vcs, host));
    }

    /// Fakes of `root`, registering a clone on main if unknown
    pub fn repo(&self, root: &Path) -> (FakeVcs, FakeHost) {
        self.repos
            .lock()
            .unwrap()
            .entry(root.to_path_buf())
            .or_insert_with(|| (FakeVcs::on_branch(MAIN_BRANCH), FakeHost::default()))
            .clone()
    }
}

impl Connector for FakeConnector {
    fn vcs(&self, root: &Path) -> Arc<dyn Vcs> {
        Arc::new(self.repo(root).0)
    }

    fn host(&self, root: &Path) -> Arc<dyn PullRequestHost> {
        Arc::new(self.repo(root).1)
    }
}

/// The three repositories under a temporary doc home, with a current document
pub struct TestEnv {
    pub dir: TempDir,
    pub config: Config,
    pub store: Arc<MemoryPointerStore>,
    pub connector: FakeConnector,
    pub generator: FakeGenerator,
    pub pointer: CurrentPointer,
}

impl TestEnv {
    /// Current document `a/70525_publish`; every clone is on its branch
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::default().with_cli_overrides(Some(dir.path().to_path_buf()));
        let pointer = CurrentPointer::new("a", "70525", "publish");
        let store = Arc::new(MemoryPointerStore::with_pointer(&pointer));

        let connector = FakeConnector::default();
        for root in [config.paths.base(), config.paths.zenn(), config.paths.qiita()] {
            std::fs::create_dir_all(&root).unwrap();
            connector.register(&root, FakeVcs::on_branch(&pointer.key), FakeHost::default());
        }

        let generator = FakeGenerator::default()
            .creating(&config.paths.zenn(), "articles", ZENN_NEW)
            .creating(&config.paths.qiita(), "public", QIITA_NEW);

        Self {
            dir,
            config,
            store,
            connector,
            generator,
            pointer,
        }
    }

    pub fn session(&self, toggles: Toggles) -> Session {
        Session::new(
            self.config.clone(),
            toggles,
            self.store.clone(),
            Arc::new(self.connector.clone()),
            Arc::new(self.generator.clone()),
        )
    }

    pub fn root(&self, kind: DestinationKind) -> PathBuf {
        match kind {
            DestinationKind::Base => self.config.paths.base(),
            DestinationKind::Zenn => self.config.paths.zenn(),
            DestinationKind::Qiita => self.config.paths.qiita(),
        }
    }

    /// Replace the fakes of `kind`'s clone
    pub fn register(&self, kind: DestinationKind, vcs: FakeVcs, host: FakeHost) {
        self.connector.register(&self.root(kind), vcs, host);
    }

    pub fn repo(&self, kind: DestinationKind) -> (FakeVcs, FakeHost) {
        self.connector.repo(&self.root(kind))
    }

    /// Write `content` to `rel` under `kind`'s clone
    pub fn write(&self, kind: DestinationKind, rel: &str, content: &str) -> PathBuf {
        let path = self.root(kind).join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// The base document and its metadata
    pub fn write_base_document(&self, body: &str) -> PathBuf {
        self.write(
            DestinationKind::Base,
            "docs/meta/70525_publish.yaml",
            "title: Publish\ntags: Rust Git\ntype: tech\nemoji: 🐚\n",
        );
        self.write(DestinationKind::Base, "docs/a/70525_publish.md", body)
    }
}

/// Head of a freshly generated Zenn article
pub const ZENN_NEW: &str = "---\ntitle: \"\"\nemoji: \"😸\"\ntype: \"tech\"\ntopics: []\npublished: false\n---\n";

/// Head of a freshly generated Qiita article
pub const QIITA_NEW: &str = "---\ntitle: newArticle001\ntags:\n  - ''\nprivate: false\nupdated_at: ''\nid: null\norganization_url_name: null\nslide: false\nignorePublish: false\n---\n# new article body\n";
