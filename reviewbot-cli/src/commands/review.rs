//! Review command - review a saved diff file and print the result

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use reviewbot_core::{Config, Review, ReviewRequest, ReviewRequester, Secrets};

/// Arguments for the review command
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Path to a unified diff file (e.g. `git diff main...HEAD > pr_diff.txt`)
    #[arg(required = true)]
    pub diff_file: PathBuf,
}

impl ReviewArgs {
    /// Execute the review command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let diff_text = read_diff(&self.diff_file)?;

        tracing::info!(
            path = %self.diff_file.display(),
            bytes = diff_text.len(),
            "Reviewing diff file"
        );

        let review = request_review(&diff_text, config).await?;
        println!("{}", review.markdown);
        Ok(())
    }
}

/// Read a diff file as UTF-8
pub fn read_diff(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Error reading diff file '{}'", path.display()))
}

/// Validate inputs and resolve the credential for one review call
///
/// The diff is checked before the credential, and both before any network
/// traffic.
pub fn prepare_review(
    diff_text: &str,
    config: &Config,
) -> anyhow::Result<(ReviewRequester, ReviewRequest)> {
    let requester = ReviewRequester::new(config.inference.clone())?
        .with_instructions(config.review.instructions.clone());
    let prompt = requester.build_prompt(diff_text)?;

    let credential = Secrets::load()?.inference_credential(&config.inference.token_env)?;
    let request = ReviewRequest::new(&config.inference.model, prompt, credential)?;

    Ok((requester, request))
}

/// Run the single review call for `diff_text` with the resolved configuration
async fn request_review(diff_text: &str, config: &Config) -> anyhow::Result<Review> {
    let (requester, request) = prepare_review(diff_text, config)?;
    Ok(requester.send(request).await?)
}
