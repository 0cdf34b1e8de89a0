//! claimcheck - Claim detection and evidence-based fact checking
//!
//! Splits free-form text into sentences, flags the verifiable factual
//! claims, retrieves web evidence for each claim and labels it
//! SUPPORTED, REFUTED or NEI (not enough information).
//!
//! # Architecture
//!
//! Data flows one way through the pipeline:
//! - Text is segmented into sentences and each sentence is flagged
//! - Each claim becomes a search query against an evidence provider
//! - Evidence is ranked (BM25 + Jaccard similarity, stance heuristic)
//! - Results are returned in aggregate or streamed as numbered events
//!
//! # Modules
//!
//! - `adapters`: Evidence providers (Bing, DuckDuckGo, Wikipedia, composite)
//! - `core`: Ranking, query formulation, streaming and orchestration
//! - `domain`: Data structures (Sentence, EvidenceItem, ClaimResult, StreamEvent)
//! - `text`: Segmentation, tokenization and claim detection
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Check a text
//! echo "Paris is the capital of France." | claimcheck check
//!
//! # Stream NDJSON events
//! claimcheck check --input article.txt --stream
//!
//! # See which sentences count as claims
//! claimcheck detect --input article.txt
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod text;

// Re-export main types at crate root for convenience
pub use adapters::{select_provider, EvidenceProvider, ProviderError, ProviderMode};
pub use config::Settings;
pub use crate::core::{Orchestrator, PipelineError};
pub use domain::{
    ClaimResult, EvidenceItem, InferenceRequest, InferenceResult, Label, Sentence, StreamEvent,
    StreamFrame,
};
pub use text::ClaimDetector;
