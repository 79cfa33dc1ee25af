//! reviewbot Core - Core library for AI pull request reviews
//!
//! This crate turns a unified diff into a Markdown review with a single call
//! to a hosted chat-completions endpoint, and provides the configuration,
//! secrets and git plumbing around that call.

pub mod config;
pub mod error;
pub mod git;
pub mod review;
pub mod secrets;

pub use config::{Config, InferenceConfig, ReviewConfig};
pub use error::{Error, Result};
pub use git::GitRepo;
pub use review::{ArtifactSink, Review, ReviewPrompt, ReviewRequest, ReviewRequester, ReviewSink};
pub use secrets::{Credential, Secrets};
