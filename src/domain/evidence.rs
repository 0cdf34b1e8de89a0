//! Evidence records returned by search providers and the ranker.

use serde::{Deserialize, Serialize};

/// One external source record retrieved for a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Title of the source
    pub title: String,

    /// URL of the source
    pub url: String,

    /// Short text snippet from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Provider rank score, or relevance magnitude after ranking
    #[serde(default)]
    pub score: f64,

    /// Provider label (e.g. "bing", "wikipedia")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Provider-specific extras (rank, description, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl EvidenceItem {
    /// Create an item with a title and url
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: None,
            score: 0.0,
            source: None,
            metadata: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Snippet text, empty when absent
    pub fn snippet_text(&self) -> &str {
        self.snippet.as_deref().unwrap_or("")
    }

    /// True when both title and url are non-empty after trimming
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// An evidence item annotated with ranking signals for one claim.
///
/// Lives only for the duration of a single ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEvidence {
    pub item: EvidenceItem,

    /// 0.8 * BM25 + 0.2 * Jaccard
    pub similarity: f64,

    /// Heuristic stance in [-1, 1]; positive supports, negative refutes
    pub stance: f64,

    /// similarity * max(0, stance)
    pub support_score: f64,

    /// similarity * max(0, -stance)
    pub refute_score: f64,
}

impl ScoredEvidence {
    pub fn new(item: EvidenceItem, similarity: f64, stance: f64) -> Self {
        Self {
            item,
            similarity,
            stance,
            support_score: similarity * stance.max(0.0),
            refute_score: similarity * (-stance).max(0.0),
        }
    }

    /// Relevance magnitude, independent of direction
    pub fn relevance(&self) -> f64 {
        self.similarity * self.stance.abs()
    }

    /// Strip the ranking signals, keeping the relevance magnitude as score
    pub fn into_item(self) -> EvidenceItem {
        let score = self.relevance();
        EvidenceItem { score, ..self.item }
    }
}
