//! GitHub Actions context: repository, event payload, API root
//!
//! The CI reviewer reads the pull request number and base branch from the
//! `pull_request` event payload that Actions writes to `GITHUB_EVENT_PATH`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// The parts of a `pull_request` event payload reviewbot uses
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Top-level PR number (present on pull_request events)
    #[serde(default)]
    pub number: Option<u64>,
    /// The pull request object
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
}

/// Pull request object inside an event payload
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    /// PR number
    pub number: u64,
    /// Target branch
    pub base: GitRef,
    /// Source branch
    pub head: GitRef,
}

/// Branch reference inside an event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Branch name
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Commit SHA
    pub sha: String,
}

impl PullRequestEvent {
    /// Parse an event payload
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse(format!("Invalid event payload: {}", e)))
    }

    /// Read and parse an event payload file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Pull request number, if this is a pull request event
    pub fn pr_number(&self) -> Option<u64> {
        self.pull_request
            .as_ref()
            .map(|pr| pr.number)
            .or(self.number)
    }

    /// Base branch name, if this is a pull request event
    pub fn base_ref(&self) -> Option<&str> {
        self.pull_request.as_ref().map(|pr| pr.base.ref_name.as_str())
    }
}

/// Values GitHub Actions exposes through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionsContext {
    /// `owner/repo` from GITHUB_REPOSITORY
    pub repository: Option<String>,
    /// Event payload path from GITHUB_EVENT_PATH
    pub event_path: Option<PathBuf>,
    /// REST API root from GITHUB_API_URL
    pub api_url: Option<String>,
}

impl ActionsContext {
    /// Read the context from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context using an arbitrary environment lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            repository: get("GITHUB_REPOSITORY"),
            event_path: get("GITHUB_EVENT_PATH").map(PathBuf::from),
            api_url: get("GITHUB_API_URL"),
        }
    }

    /// Repository slug, failing when not running under Actions
    pub fn require_repository(&self) -> Result<&str> {
        self.repository
            .as_deref()
            .ok_or_else(|| Error::MissingEnv("GITHUB_REPOSITORY".to_string()))
    }

    /// Load the event payload if GITHUB_EVENT_PATH is set
    pub fn event(&self) -> Result<Option<PullRequestEvent>> {
        match &self.event_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading event payload");
                PullRequestEvent::load(path).map(Some)
            }
            None => Ok(None),
        }
    }
}
