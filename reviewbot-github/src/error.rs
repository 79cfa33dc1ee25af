//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    /// Pull request not found
    #[error("Pull request #{0} not found")]
    PrNotFound(u64),

    /// Event payload could not be read
    #[error("Failed to read event payload: {0}")]
    Event(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for reviewbot_core::Error {
    fn from(err: Error) -> Self {
        reviewbot_core::Error::Other(err.to_string())
    }
}
