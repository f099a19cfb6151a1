//! Error types for mirrorpub

use thiserror::Error;

/// Result type alias for mirrorpub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mirrorpub operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutating operation was attempted while the wrong branch is checked out
    #[error("Refusing to {operation}: current branch '{current}' is not '{target}'")]
    SafetyViolation {
        /// The refused operation (e.g. "git add")
        operation: String,
        /// The branch actually checked out
        current: String,
        /// The branch the document owns
        target: String,
    },

    /// A git or gh subprocess exited with a failure
    #[error("Command failed: {command}: {stderr}")]
    Command {
        /// The command line that failed
        command: String,
        /// Trimmed stderr of the process
        stderr: String,
    },

    /// Pull request platform error
    #[error("Pull request error: {0}")]
    PullRequest(String),

    /// Generator output or document content is malformed
    #[error("Content validation error: {0}")]
    ContentValidation(String),

    /// The repository has work that is not committed or not pushed
    #[error("{repo} has uncommitted changes")]
    UncommittedChanges {
        /// `{repo}:{branch}` label of the repository
        repo: String,
    },

    /// A key did not resolve to exactly one document
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::Command`] from a command line and its captured stderr
    pub fn command(program: &str, args: &[&str], stderr: &[u8]) -> Self {
        Error::Command {
            command: format!("{} {}", program, args.join(" ")),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Whether this error is a refusal by the branch safety gate
    pub fn is_safety_violation(&self) -> bool {
        matches!(self, Error::SafetyViolation { .. })
    }
}
