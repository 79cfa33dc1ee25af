//! Configuration management for reviewbot
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVIEWBOT_*)
//! 3. Config file (~/.config/reviewbot/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// GitHub Models chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Value sent in the `X-GitHub-Api-Version` header
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Inference endpoint configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Full URL of the chat-completions endpoint
    pub endpoint: String,

    /// Model identifier understood by the endpoint
    pub model: String,

    /// API version header value
    pub api_version: String,

    /// Request timeout for the single inference call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Name of the environment variable holding the bearer token
    pub token_env: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Review output configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Replacement for the built-in reviewer instructions
    pub instructions: Option<String>,

    /// Artifact file written by the CI reviewer
    pub artifact_path: PathBuf,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            instructions: None,
            artifact_path: PathBuf::from("ai_review.md"),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Inference endpoint configuration
    pub inference: InferenceConfig,

    /// Review output configuration
    pub review: ReviewConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reviewbot/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewbot").join("config.toml"))
    }

    /// Apply environment variable overrides from the process environment
    ///
    /// Supported variables:
    /// - REVIEWBOT_MODEL: Model identifier
    /// - REVIEWBOT_ENDPOINT: Chat-completions endpoint URL
    /// - REVIEWBOT_TIMEOUT: Request timeout (e.g. "90s", "2m")
    /// - REVIEWBOT_OUTPUT: Artifact file path
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using an arbitrary lookup
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("REVIEWBOT_MODEL") {
            self.inference.model = model;
        }

        if let Some(endpoint) = lookup("REVIEWBOT_ENDPOINT") {
            self.inference.endpoint = endpoint;
        }

        if let Some(timeout) = lookup("REVIEWBOT_TIMEOUT") {
            self.inference.timeout = humantime_serde::re::humantime::parse_duration(&timeout)
                .map_err(|e| Error::Config(format!("Invalid REVIEWBOT_TIMEOUT '{}': {}", timeout, e)))?;
        }

        if let Some(output) = lookup("REVIEWBOT_OUTPUT") {
            self.review.artifact_path = PathBuf::from(output);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, model: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(m) = model {
            self.inference.model = m;
        }

        if let Some(e) = endpoint {
            self.inference.endpoint = e;
        }

        self
    }

    /// Check values that would otherwise only fail at request time
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.inference.endpoint).map_err(|e| {
            Error::Config(format!(
                "Invalid inference endpoint '{}': {}",
                self.inference.endpoint, e
            ))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Inference endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if self.inference.timeout.is_zero() {
            return Err(Error::Config("Inference timeout must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(model: Option<String>, endpoint: Option<String>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(model, endpoint);
        config.validate()?;
        Ok(config)
    }
}
