//! Inference requests and their aggregate results.
//!
//! A run covers one request: the sentences found in its text, one
//! `ClaimResult` per claim sentence and the metadata describing how the
//! run was executed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::claim::{ClaimResult, Label};
use super::sentence::Sentence;

/// Smallest accepted `top_k`
pub const MIN_TOP_K: usize = 1;

/// Largest accepted `top_k`
pub const MAX_TOP_K: usize = 50;

/// Default `top_k` when the caller does not set one
pub const DEFAULT_TOP_K: usize = 5;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Request payload for one inference run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Raw input text
    pub text: String,

    /// Number of search results to retrieve per claim
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Optional language code (e.g. "en")
    #[serde(default)]
    pub language: Option<String>,

    /// Whether the caller wants incremental events
    #[serde(default)]
    pub streaming: bool,

    /// Caller metadata, echoed back in the result
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl InferenceRequest {
    /// Create a request with default options
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: DEFAULT_TOP_K,
            language: None,
            streaming: false,
            metadata: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// `top_k` clamped into `[MIN_TOP_K, MAX_TOP_K]`
    pub fn effective_top_k(&self) -> usize {
        self.top_k.clamp(MIN_TOP_K, MAX_TOP_K)
    }
}

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceStatus {
    /// All stages ran (individual claims may still be NEI)
    Completed,

    /// A pipeline-level failure stopped the run
    Error,
}

/// How a run was executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed_ms: u64,

    /// Name of the evidence provider used
    pub provider: String,

    /// Effective (clamped) top_k
    pub top_k: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub streaming: bool,

    /// Caller metadata echoed from the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Map<String, serde_json::Value>>,
}

impl RunMetadata {
    /// Start metadata for a request; `elapsed_ms` is filled on finish
    pub fn start(request: &InferenceRequest, provider: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            elapsed_ms: 0,
            provider: provider.into(),
            top_k: request.effective_top_k(),
            language: request.language.clone(),
            streaming: request.streaming,
            request: request.metadata.clone(),
        }
    }
}

/// Aggregate result for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    pub status: InferenceStatus,

    /// Every sentence found in the input, with claim flags
    #[serde(default)]
    pub sentences: Vec<Sentence>,

    /// One result per claim sentence, in sentence order
    #[serde(default)]
    pub claims: Vec<ClaimResult>,

    pub metadata: RunMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InferenceResult {
    /// A completed result
    pub fn completed(
        sentences: Vec<Sentence>,
        claims: Vec<ClaimResult>,
        metadata: RunMetadata,
    ) -> Self {
        Self {
            status: InferenceStatus::Completed,
            sentences,
            claims,
            metadata,
            message: None,
        }
    }

    /// A failed result: no partial sentences or claims are exposed
    pub fn failed(message: impl Into<String>, metadata: RunMetadata) -> Self {
        Self {
            status: InferenceStatus::Error,
            sentences: Vec::new(),
            claims: Vec::new(),
            metadata,
            message: Some(message.into()),
        }
    }

    /// Count-level view of this result
    pub fn summary(&self) -> RunSummary {
        let count = |label: Label| self.claims.iter().filter(|c| c.label == label).count();
        RunSummary {
            status: self.status,
            sentence_count: self.sentences.len(),
            claim_count: self.claims.len(),
            supported: count(Label::Supported),
            refuted: count(Label::Refuted),
            nei: count(Label::Nei),
            metadata: self.metadata.clone(),
        }
    }
}

/// Run summary carried by the final `done` stream event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: InferenceStatus,
    pub sentence_count: usize,
    pub claim_count: usize,
    pub supported: usize,
    pub refuted: usize,
    pub nei: usize,
    pub metadata: RunMetadata,
}
