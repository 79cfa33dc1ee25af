//! CI command - review a pull request inside a pipeline
//!
//! Obtains the diff, runs the review once, then writes the artifact and posts
//! the PR comment. A failed review stops the run before anything is written.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use reviewbot_core::review::publish_all;
use reviewbot_core::{ArtifactSink, Config, GitRepo, ReviewSink};
use reviewbot_github::{
    parse_github_url, ActionsContext, GitHubClient, PrCommentSink, PullRequestEvent,
};

use super::review::{prepare_review, read_diff};

/// Arguments for the ci command
#[derive(Args, Debug)]
pub struct CiArgs {
    /// Read the diff from this file instead of computing it with git
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Base revision to diff against (defaults to origin/<PR base branch>)
    #[arg(long)]
    pub base: Option<String>,

    /// Repository checkout used to compute the diff
    #[arg(short = 'd', long, default_value = ".")]
    pub workdir: PathBuf,

    /// Artifact file for the review (defaults to review.artifact_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Repository as owner/repo (defaults to GITHUB_REPOSITORY)
    #[arg(long)]
    pub repo: Option<String>,

    /// Pull request number (defaults to the event payload)
    #[arg(long)]
    pub pr: Option<u64>,

    /// Only write the artifact; do not comment on the pull request
    #[arg(long)]
    pub no_comment: bool,
}

impl CiArgs {
    /// Execute the ci command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ctx = ActionsContext::from_env();
        let event = ctx.event()?;

        let diff_text = self.load_diff(event.as_ref())?;

        // The inference credential is checked before anything GitHub-related
        // so a missing token reports as a failed review
        let (requester, request) = prepare_review(&diff_text, config)?;

        // Resolve the comment target up front so a misconfigured run fails
        // before the inference call
        let comment_sink = if self.no_comment {
            None
        } else {
            Some(self.comment_sink(&ctx, event.as_ref())?)
        };
        let commented_pr = comment_sink.as_ref().map(PrCommentSink::pr_number);

        let review = requester.send(request).await?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| config.review.artifact_path.clone());

        let mut sinks: Vec<Box<dyn ReviewSink>> = vec![Box::new(ArtifactSink::new(&output))];
        if let Some(sink) = comment_sink {
            sinks.push(Box::new(sink));
        }
        publish_all(&review, &sinks).await?;

        println!("Review written to {}", output.display());
        if let Some(pr_number) = commented_pr {
            println!("Review posted as a comment on pull request #{}", pr_number);
        }

        Ok(())
    }

    fn load_diff(&self, event: Option<&PullRequestEvent>) -> anyhow::Result<String> {
        if let Some(path) = &self.diff_file {
            return read_diff(path);
        }

        let base = match (&self.base, event.and_then(|e| e.base_ref())) {
            (Some(base), _) => base.clone(),
            (None, Some(base_ref)) => format!("origin/{}", base_ref),
            (None, None) => anyhow::bail!(
                "No base revision: pass --base or --diff-file, or run on a pull_request event"
            ),
        };

        let repo = GitRepo::open(&self.workdir)?;
        tracing::info!(base = %base, root = %repo.root().display(), "Computing diff with git");
        Ok(repo.diff_against(&base)?)
    }

    fn comment_sink(
        &self,
        ctx: &ActionsContext,
        event: Option<&PullRequestEvent>,
    ) -> anyhow::Result<PrCommentSink> {
        let repository = match &self.repo {
            Some(repo) => repo.as_str(),
            None => ctx.require_repository()?,
        };
        let (owner, repo) = parse_github_url(repository)?;

        let pr_number = self
            .pr
            .or_else(|| event.and_then(|e| e.pr_number()))
            .context("No pull request number: pass --pr or run on a pull_request event")?;

        let client = GitHubClient::from_secrets(owner, repo, ctx.api_url.as_deref())?;
        Ok(PrCommentSink::new(client, pr_number))
    }
}
