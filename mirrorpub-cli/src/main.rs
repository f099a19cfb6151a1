//! Mirrorpub CLI - Command line interface for mirrorpub
//!
//! Keeps one authored document and its Zenn and Qiita mirrors on a branch per document.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mirrorpub_core::{CommandGenerator, Config, FilePointerStore, Session, Toggles};
use mirrorpub_github::GitHubConnector;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    AddMediaArgs, CheckoutArgs, CommitArgs, CurrentArgs, DiffArgs, InitArgs, NewArgs,
    NolookArgs, PublishArgs, StatusArgs, TagsArgs, UpdateArgs,
};

const LONG_ABOUT: &str = "Publish one document to its base repository and its Zenn and Qiita \
mirrors, each document on its own branch.

Run one mirrorpub command at a time per repository clone: nothing locks a clone, git writes \
are only refused when the clone is not on the document's branch.";

/// mirrorpub: publish one document to its base repository and its Zenn and Qiita mirrors
#[derive(Parser, Debug)]
#[command(name = "mirrorpub")]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the repository clones (overrides config and env)
    #[arg(long, global = true)]
    doc_home: Option<PathBuf>,

    /// Report what would happen without writing anything
    #[arg(long, global = true)]
    dry: bool,

    /// Open pull requests but never merge them
    #[arg(long, global = true)]
    no_merge: bool,

    /// Proceed even with uncommitted changes
    #[arg(long, global = true)]
    ignore: bool,

    /// Write files but skip git add, commit and push
    #[arg(long, global = true)]
    no_git: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn toggles(&self) -> Toggles {
        Toggles {
            dry_run: self.dry,
            no_merge: self.no_merge,
            ignore_uncommitted: self.ignore,
            no_git: self.no_git,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Start a new document on its own branch
    New(NewArgs),

    /// Resume a document by its key
    #[command(visible_alias = "co")]
    Checkout(CheckoutArgs),

    /// Create the mirror article of the current document
    Init(InitArgs),

    /// Refresh the mirror article from the base document
    Update(UpdateArgs),

    /// Open and merge the pull request of the current document
    Publish(PublishArgs),

    /// Commit and push the base repository
    Commit(CommitArgs),

    /// Show diffs and stage tracked changes
    Diff(DiffArgs),

    /// Show git status of the repositories
    #[command(visible_alias = "st")]
    Status(StatusArgs),

    /// Copy media files next to the current document
    AddMedia(AddMediaArgs),

    /// List tags used by the documents
    Tags(TagsArgs),

    /// Show the current document
    Current(CurrentArgs),

    /// Update both mirrors and publish everything in one go
    Nolook(NolookArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.doc_home.clone())?;
    let toggles = cli.toggles();

    if cli.verbose {
        tracing::info!(
            doc_home = %config.paths.doc_home.display(),
            ?toggles,
            "Configuration loaded"
        );
    }

    let session = Session::new(
        config.clone(),
        toggles,
        Arc::new(FilePointerStore::new(config.paths.scratch())),
        Arc::new(GitHubConnector),
        Arc::new(CommandGenerator),
    );

    match cli.command {
        Some(Commands::Version) => {
            println!("mirrorpub {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::New(args)) => args.execute(&session)?,
        Some(Commands::Checkout(args)) => args.execute(&session)?,
        Some(Commands::Init(args)) => args.execute(&session)?,
        Some(Commands::Update(args)) => args.execute(&session)?,
        Some(Commands::Publish(args)) => args.execute(&session)?,
        Some(Commands::Commit(args)) => args.execute(&session)?,
        Some(Commands::Diff(args)) => args.execute(&session)?,
        Some(Commands::Status(args)) => args.execute(&session)?,
        Some(Commands::AddMedia(args)) => args.execute(&session)?,
        Some(Commands::Tags(args)) => args.execute(&session)?,
        Some(Commands::Current(args)) => args.execute(&session)?,
        Some(Commands::Nolook(args)) => args.execute(&session)?,
        Some(Commands::Config) => {
            println!("Mirrorpub Configuration");
            println!("=======================");
            println!();
            println!("Repositories:");
            println!("  base: {}", config.paths.base().display());
            println!("  zenn: {}", config.paths.zenn().display());
            println!("  qiita: {}", config.paths.qiita().display());
            println!("  scratch: {}", config.paths.scratch().display());
            println!();
            println!("Generators:");
            println!("  zenn: {}", config.generators.zenn.join(" "));
            println!("  qiita: {}", config.generators.qiita.join(" "));
            println!();
            println!("Defaults:");
            println!("  series: {}", config.defaults.series);
            println!("  tags: {}", config.defaults.tags);
            println!("  type: {}", config.defaults.kind);
            println!("  emoji: {}", config.defaults.emoji);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("mirrorpub - branch-per-document publishing to Zenn and Qiita");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
