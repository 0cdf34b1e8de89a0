//! Text processing: segmentation, tokenization and claim detection.

pub mod claims;
pub mod segment;
pub mod tokenize;

pub use claims::ClaimDetector;
pub use segment::{SegmentError, Segmenter, SentenceSpan, UnicodeSegmenter};
pub use tokenize::{is_stopword, raw_tokens, tokenize};
