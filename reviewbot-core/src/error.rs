//! Error types for reviewbot

use thiserror::Error;

/// Result type alias for reviewbot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reviewbot operations
#[derive(Error, Debug)]
pub enum Error {
    /// The diff handed to the reviewer was empty or whitespace only
    #[error("Empty diff provided; nothing to review")]
    EmptyDiff,

    /// Credential missing, empty, or rejected by the inference endpoint
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The endpoint does not know or cannot serve the requested model
    #[error("Model '{model}' is unavailable: {detail}")]
    ModelUnavailable {
        /// Model identifier that was requested
        model: String,
        /// Detail reported by the endpoint (or by validation)
        detail: String,
    },

    /// Network or transport level failure of the single inference call
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered but the completion was null or empty
    #[error("Inference endpoint returned an empty completion")]
    EmptyResponse,

    /// Non-success status not covered by a more specific variant
    #[error("Inference endpoint returned {status}: {snippet}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Truncated response body
        snippet: String,
    },

    /// Success status but the body did not have the expected shape
    #[error("Unexpected response format from inference endpoint: {0}")]
    MalformedResponse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git error while extracting a diff
    #[error("Git error: {0}")]
    Git(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error belongs to the review call itself, as opposed to
    /// local setup (files, configuration, git)
    pub fn is_review_failure(&self) -> bool {
        matches!(
            self,
            Error::EmptyDiff
                | Error::Authentication(_)
                | Error::ModelUnavailable { .. }
                | Error::Transport(_)
                | Error::EmptyResponse
                | Error::UnexpectedStatus { .. }
                | Error::MalformedResponse(_)
        )
    }
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Git(err.message().to_string())
    }
}
