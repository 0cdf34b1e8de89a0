//! Domain types for claim checking.
//!
//! This module contains the core data structures:
//! - Sentence: Segmented input with claim flags
//! - Evidence: Items returned by providers and ranking signals
//! - Claim: Per-claim verdicts
//! - Run: Requests and aggregate results
//! - Events: Stream events and frames

pub mod claim;
pub mod events;
pub mod evidence;
pub mod run;
pub mod sentence;

// Re-export commonly used types
pub use claim::{ClaimResult, Label};
pub use events::{
    ErrorPayload, EventPayload, EventType, EvidencePayload, ScorePayload, SentencePayload,
    StreamEvent, StreamFrame,
};
pub use evidence::{EvidenceItem, ScoredEvidence};
pub use run::{
    InferenceRequest, InferenceResult, InferenceStatus, RunMetadata, RunSummary, DEFAULT_TOP_K,
    MAX_TOP_K, MIN_TOP_K,
};
pub use sentence::Sentence;
