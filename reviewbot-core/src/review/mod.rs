//! Review module: diff-to-review request/response
//!
//! This module builds the reviewer prompt, performs the single inference call
//! and hands finished reviews to sinks (artifact files, PR comments).

pub mod prompt;
pub mod requester;
pub mod sink;
mod wire;

pub use prompt::{ReviewPrompt, DEFAULT_INSTRUCTIONS};
pub use requester::{Review, ReviewRequest, ReviewRequester};
pub use sink::{publish_all, ArtifactSink, ReviewSink};
