//! Destinations for a finished review

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::{Error, Result};

use super::Review;

/// Something a completed review is handed to
#[async_trait]
pub trait ReviewSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Publish the review
    async fn publish(&self, review: &Review) -> Result<()>;
}

/// Writes the review to a Markdown file for archival
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    path: PathBuf,
}

impl ArtifactSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReviewSink for ArtifactSink {
    fn name(&self) -> &'static str {
        "artifact"
    }

    async fn publish(&self, review: &Review) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        let mut contents = review.markdown.clone();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(Error::Io)?;

        info!(path = %self.path.display(), "Wrote review artifact");
        Ok(())
    }
}

/// Publish to every sink in order, stopping at the first failure
pub async fn publish_all(review: &Review, sinks: &[Box<dyn ReviewSink>]) -> Result<()> {
    for sink in sinks {
        sink.publish(review).await.map_err(|e| {
            tracing::error!(sink = sink.name(), error = %e, "Failed to publish review");
            e
        })?;
    }
    Ok(())
}
