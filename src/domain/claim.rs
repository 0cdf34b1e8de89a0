//! Per-claim verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::evidence::EvidenceItem;

/// Three-way verdict for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Evidence leans towards the claim
    Supported,

    /// Evidence leans against the claim
    Refuted,

    /// Not enough information
    Nei,
}

impl Default for Label {
    fn default() -> Self {
        Self::Nei
    }
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Supported => "SUPPORTED",
            Label::Refuted => "REFUTED",
            Label::Nei => "NEI",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result for one claim sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    /// The claim text (the sentence itself)
    pub claim: String,

    /// Index of the sentence in the input (0-based)
    pub sentence_index: usize,

    /// Items that support the claim, strongest first
    #[serde(default)]
    pub supporting_evidence: Vec<EvidenceItem>,

    /// Items that refute the claim, strongest first
    #[serde(default)]
    pub refuting_evidence: Vec<EvidenceItem>,

    /// Sum of kept support scores minus sum of kept refute scores
    #[serde(default)]
    pub score: f64,

    pub label: Label,
}

impl ClaimResult {
    /// An NEI result with no evidence
    pub fn inconclusive(claim: impl Into<String>, sentence_index: usize) -> Self {
        Self {
            claim: claim.into(),
            sentence_index,
            supporting_evidence: Vec::new(),
            refuting_evidence: Vec::new(),
            score: 0.0,
            label: Label::Nei,
        }
    }
}
