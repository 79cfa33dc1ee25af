//! Git repository detection and diff extraction

use std::path::{Path, PathBuf};

use git2::{DiffFormat, DiffOptions, Repository};
use tracing::{debug, info};

use crate::{Error, Result};

/// A git repository wrapper providing the operations reviewbot needs
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// This will search upward from the given path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Git(format!(
                    "Not a git repository: {}. Run from a checkout or pass --diff-file.",
                    path.display()
                ))
            } else {
                Error::Git(e.message().to_string())
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Git("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Unified diff of HEAD against its merge base with `base`
    ///
    /// This is what `git diff base...HEAD` prints: only the changes made on
    /// the current branch, not those that landed on `base` meanwhile.
    pub fn diff_against(&self, base: &str) -> Result<String> {
        let base_commit = self
            .repo
            .revparse_single(base)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| {
                Error::Git(format!("Cannot resolve base revision '{}': {}", base, e.message()))
            })?;
        let head_commit = self.repo.head()?.peel_to_commit()?;

        let merge_base = self.repo.merge_base(base_commit.id(), head_commit.id())?;
        debug!(base, merge_base = %merge_base, head = %head_commit.id(), "Computing diff");

        let base_tree = self.repo.find_commit(merge_base)?.tree()?;
        let head_tree = head_commit.tree()?;

        let mut opts = DiffOptions::new();
        opts.context_lines(3);
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), Some(&mut opts))?;

        let mut out = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                out.push(line.origin());
            }
            out.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        info!(base, files = diff.deltas().len(), bytes = out.len(), "Extracted diff");
        Ok(out)
    }
}
