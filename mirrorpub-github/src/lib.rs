//! Mirrorpub GitHub - GitHub integration for mirrorpub
//!
//! Pull requests are created, queried and merged through the `gh` CLI, which owns
//! authentication (`gh auth login`).

mod connector;
mod error;
mod gh;

pub use connector::GitHubConnector;
pub use error::{Error, Result};
pub use gh::GhCli;
