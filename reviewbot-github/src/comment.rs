//! Posting reviews as pull request comments

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reviewbot_core::{Review, ReviewSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Heading placed above every posted review
pub const REVIEW_HEADING: &str = "## 🤖 AI Code Review";

/// A comment created on a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedComment {
    /// Comment ID
    pub id: u64,
    /// Link to the comment
    #[serde(default)]
    pub html_url: Option<String>,
    /// When the comment was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Format the comment body for a review
pub fn format_review_comment(review: &Review) -> String {
    format!(
        "{}\n\n{}\n\n<sub>Generated by `{}`</sub>\n",
        REVIEW_HEADING,
        review.markdown.trim_end(),
        review.model
    )
}

impl GitHubClient {
    /// Post a comment on a pull request's conversation
    pub async fn post_pr_comment(&self, pr_number: u64, body: &str) -> Result<PostedComment> {
        // PR conversation comments go through the issues API
        let route = format!(
            "/repos/{}/{}/issues/{}/comments",
            self.owner(),
            self.repo(),
            pr_number
        );
        debug!(pr_number, body_len = body.len(), "Posting PR comment");

        let comment: PostedComment = self
            .client()
            .post(route, Some(&CommentBody { body }))
            .await
            .map_err(|e| match &e {
                octocrab::Error::GitHub { source, .. }
                    if source.message.contains("Not Found") =>
                {
                    Error::PrNotFound(pr_number)
                }
                _ => Error::Api(e),
            })?;

        info!(
            pr_number,
            comment_id = comment.id,
            url = comment.html_url.as_deref().unwrap_or(""),
            "Posted review comment"
        );

        Ok(comment)
    }
}

/// Publishes reviews as a comment on one pull request
#[derive(Debug)]
pub struct PrCommentSink {
    client: GitHubClient,
    pr_number: u64,
}

impl PrCommentSink {
    /// Create a sink commenting on `pr_number`
    pub fn new(client: GitHubClient, pr_number: u64) -> Self {
        Self { client, pr_number }
    }

    /// Target pull request number
    pub fn pr_number(&self) -> u64 {
        self.pr_number
    }
}

#[async_trait]
impl ReviewSink for PrCommentSink {
    fn name(&self) -> &'static str {
        "pr-comment"
    }

    async fn publish(&self, review: &Review) -> reviewbot_core::Result<()> {
        let body = format_review_comment(review);
        self.client.post_pr_comment(self.pr_number, &body).await?;
        Ok(())
    }
}
