//! Core claim-checking logic.
//!
//! This module contains:
//! - Ranker: Evidence similarity, stance and labelling
//! - Query: Search query formulation
//! - Stream: Event numbering and NDJSON framing
//! - Orchestrator: Main execution engine

pub mod orchestrator;
pub mod query;
pub mod ranker;
pub mod stream;

// Re-export commonly used types
pub use orchestrator::{Orchestrator, PipelineError};
pub use query::formulate_query;
pub use ranker::{rank, score_evidence, Ranking};
pub use stream::{error_event, ndjson_line, Sequencer};
