//! Mirrorpub Core - Core library for branch-per-document publishing
//!
//! This crate keeps one authored document and its Zenn and Qiita mirrors on a branch named
//! after the document, refuses git writes on any other branch, and drives the pull requests
//! that publish it.
//!
//! Single operator, single process: at most one workflow may drive a repository clone at a
//! time.

pub mod config;
pub mod date;
pub mod destination;
pub mod error;
pub mod generator;
pub mod git;
pub mod metadata;
pub mod pointer;
pub mod session;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::{Config, Toggles};
pub use destination::{DestinationKind, DestinationProfile};
pub use error::{Error, Result};
pub use generator::{CommandGenerator, Generator};
pub use git::{GitCli, PullRequestHost, RepositoryAdapter, Vcs};
pub use metadata::{ArticleMetadata, DocumentLayout};
pub use pointer::{CurrentPointer, FilePointerStore, MemoryPointerStore, PointerStore};
pub use session::{Connector, Session};
