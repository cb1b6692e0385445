//! Validated question input

use crate::error::{RagError, Result};

/// A validated, length-bounded question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Validate raw input: trim, truncate, reject empty
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RagError::InvalidInput(
                "Question cannot be empty".to_string(),
            ));
        }

        let char_count = trimmed.chars().count();
        if char_count > max_chars {
            tracing::debug!("Question truncated from {} to {} chars", char_count, max_chars);
        }

        let truncated: String = trimmed.chars().take(max_chars).collect();
        Ok(Self(truncated))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
