//! Sentences produced by segmentation.

use serde::{Deserialize, Serialize};

/// A sentence from the input text, flagged with the claim decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Sentence text (trimmed)
    pub text: String,

    /// Start character index in the original text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_char: Option<usize>,

    /// End character index (exclusive) in the original text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_char: Option<usize>,

    /// Whether the sentence was identified as a checkable claim
    pub is_claim: bool,
}

impl Sentence {
    /// Create a sentence without offsets
    pub fn new(text: impl Into<String>, is_claim: bool) -> Self {
        Self {
            text: text.into(),
            start_char: None,
            end_char: None,
            is_claim,
        }
    }

    /// Attach character offsets
    pub fn with_offsets(mut self, start_char: usize, end_char: usize) -> Self {
        self.start_char = Some(start_char);
        self.end_char = Some(end_char);
        self
    }
}
