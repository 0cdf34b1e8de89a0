//! Sentence segmentation.
//!
//! Segmentation is a pluggable capability: the orchestrator holds a
//! `Segmenter` for its lifetime and never reaches for a global instance.

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Errors that stop segmentation entirely
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Input too large: {actual} bytes (limit {limit})")]
    InputTooLarge { actual: usize, limit: usize },

    #[error("Segmenter failed: {0}")]
    Failed(String),
}

/// One segmented sentence with character offsets into the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// Splits text into ordered sentences
pub trait Segmenter: Send + Sync {
    /// Human-readable segmenter name
    fn name(&self) -> &str;

    /// Split text into sentences in reading order
    fn segment(&self, text: &str) -> Result<Vec<SentenceSpan>, SegmentError>;
}

/// Segmenter built on Unicode sentence boundaries (UAX #29)
#[derive(Debug, Clone)]
pub struct UnicodeSegmenter {
    /// Inputs above this size are refused
    pub max_input_bytes: usize,
}

impl Default for UnicodeSegmenter {
    fn default() -> Self {
        Self {
            max_input_bytes: 1_048_576, // 1MB
        }
    }
}

impl UnicodeSegmenter {
    pub fn new(max_input_bytes: usize) -> Self {
        Self { max_input_bytes }
    }
}

impl Segmenter for UnicodeSegmenter {
    fn name(&self) -> &str {
        "unicode"
    }

    fn segment(&self, text: &str) -> Result<Vec<SentenceSpan>, SegmentError> {
        if text.len() > self.max_input_bytes {
            return Err(SegmentError::InputTooLarge {
                actual: text.len(),
                limit: self.max_input_bytes,
            });
        }

        let mut spans = Vec::new();
        let mut chars_before = 0usize;

        for piece in text.split_sentence_bounds() {
            let piece_chars = piece.chars().count();
            let trimmed = piece.trim();

            if !trimmed.is_empty() {
                let leading = piece.len() - piece.trim_start().len();
                let start_char = chars_before + piece[..leading].chars().count();
                let end_char = start_char + trimmed.chars().count();
                spans.push(SentenceSpan {
                    text: trimmed.to_string(),
                    start_char,
                    end_char,
                });
            }

            chars_before += piece_chars;
        }

        Ok(spans)
    }
}
