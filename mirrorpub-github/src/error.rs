//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// The gh binary could not be started
    #[error("Failed to run gh: {0}")]
    Spawn(#[from] std::io::Error),

    /// gh exited with a failure
    #[error("gh {command} failed: {stderr}")]
    Gh {
        /// Arguments passed to gh
        command: String,
        /// Trimmed stderr
        stderr: String,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<Error> for mirrorpub_core::Error {
    fn from(err: Error) -> Self {
        mirrorpub_core::Error::PullRequest(err.to_string())
    }
}
