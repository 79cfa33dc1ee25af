//! Git operations for reviewbot
//!
//! Used by the CI reviewer to produce the pull request diff when no
//! pre-saved diff file is given.

mod repo;

pub use repo::GitRepo;
