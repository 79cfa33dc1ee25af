//! Prompt construction for diff reviews
//!
//! A prompt is the reviewer instructions followed by the raw diff. The diff is
//! passed through untouched; nothing here parses it.

use crate::{Error, Result};

/// Built-in reviewer instructions
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are an expert senior code and content reviewer.
You receive a unified Git diff. Your tasks are:

1. Change Overview
- Give a concise bullet list of the main changes.
- Name the file for each item and describe the change in a few words.

2. Detailed Diff Explanation
- For each file in the diff, explain what was added, removed and modified
  compared to the previous version.
- Quote small snippets in backticks when it helps to show old vs new behavior.

3. Quality, Risks & Sensitive Content
- Point out bugs, logic issues, readability problems and code smells.
- Review configuration and text files as well as source code.
- Flag personal, sensitive or inappropriate content that should not be
  committed, such as names, private messages or secrets.
- Mention potential security or privacy risks.

4. Actionable Recommendations
- Suggest practical improvements: refactors, better naming, extra tests,
  removal of sensitive data.

Respond in clear Markdown with these sections:

- Summary of Changes
- File-by-file Diff Explanation
- Risks & Sensitive Content
- Recommendations";

/// The complete text sent to the model for one review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompt(String);

impl ReviewPrompt {
    /// Build a prompt from the built-in instructions and a diff
    pub fn build(diff_text: &str) -> Result<Self> {
        Self::with_instructions(DEFAULT_INSTRUCTIONS, diff_text)
    }

    /// Build a prompt from custom instructions and a diff
    ///
    /// Fails with [`Error::EmptyDiff`] when the diff is blank.
    pub fn with_instructions(instructions: &str, diff_text: &str) -> Result<Self> {
        if diff_text.trim().is_empty() {
            return Err(Error::EmptyDiff);
        }

        let prompt = format!("{}\n\nDiff:\n{}", instructions.trim(), diff_text);
        Ok(Self(prompt.trim_end().to_string()))
    }

    /// Borrow the prompt text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the prompt in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty diff is rejected at construction
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ReviewPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let diff = "diff --git a/x.py b/x.py\n+ print('hello')\n";
        let prompt = ReviewPrompt::build(diff).unwrap();
        let text = prompt.as_str();

        assert!(text.starts_with("You are an expert senior code and content reviewer."));
        let diff_marker = text.find("\n\nDiff:\n").expect("diff marker");
        assert!(text.find("Recommendations").unwrap() < diff_marker);
        assert!(text.ends_with("+ print('hello')"));
    }

    #[test]
    fn test_diff_passed_through_verbatim() {
        let diff = "@@ -1,2 +1,2 @@\n-  old\n+\tnew   \n context";
        let prompt = ReviewPrompt::build(diff).unwrap();
        assert!(prompt.as_str().contains(diff));
    }

    #[test]
    fn test_empty_diff_rejected() {
        assert!(matches!(ReviewPrompt::build(""), Err(Error::EmptyDiff)));
        assert!(matches!(ReviewPrompt::build(" \n\t"), Err(Error::EmptyDiff)));
    }

    #[test]
    fn test_custom_instructions() {
        let prompt = ReviewPrompt::with_instructions("  Be terse.\n", "+x").unwrap();
        assert_eq!(prompt.as_str(), "Be terse.\n\nDiff:\n+x");
        assert_eq!(prompt.len(), prompt.to_string().len());
        assert!(!prompt.is_empty());
    }
}
