//! reviewbot GitHub - GitHub integration for reviewbot
//!
//! This crate posts finished reviews as pull request comments and reads the
//! GitHub Actions context (repository, event payload) for the CI reviewer.

mod client;
mod comment;
mod error;
mod event;

pub use client::{parse_github_url, GitHubClient};
pub use comment::{format_review_comment, PostedComment, PrCommentSink, REVIEW_HEADING};
pub use error::{Error, Result};
pub use event::{ActionsContext, GitRef, PullRequestEvent, PullRequestPayload};
