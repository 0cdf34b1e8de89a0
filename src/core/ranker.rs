//! Evidence ranking and claim labelling.
//!
//! Each evidence item is scored against the claim with a BM25-style
//! relevance function blended with Jaccard overlap, then given a stance
//! from negation and contradiction cues. Supporting and refuting items are
//! ranked separately and their kept scores decide the label.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::domain::{EvidenceItem, Label, ScoredEvidence};
use crate::text::tokenize;

/// BM25 term-frequency saturation
pub const BM25_K1: f64 = 1.2;

/// BM25 document-length normalization
pub const BM25_B: f64 = 0.75;

/// Weight of BM25 in the blended similarity (Jaccard gets the rest)
pub const BM25_WEIGHT: f64 = 0.8;

/// Stance for items carrying a contradiction cue
pub const CONTRADICTION_STANCE: f64 = -0.9;

/// Stance magnitude when negation polarity agrees or disagrees
pub const POLARITY_STANCE: f64 = 0.6;

/// Minimum directional sum for a non-NEI label
pub const LABEL_FLOOR: f64 = 0.6;

/// Margin one direction needs over the other
pub const LABEL_MARGIN: f64 = 1.2;

const NEGATION_CUES: &[&str] = &[
    "not", "no", "never", "neither", "nor", "without", "none", "cannot", "can't", "isn't",
    "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "won't", "wouldn't",
    "shouldn't",
];

const CONTRADICTION_CUES: &[&str] = &[
    "contradict", "refute", "refutes", "refuted", "false", "falsely", "debunk", "debunks",
    "debunked", "myth", "hoax", "incorrect", "misleading", "disprove", "disproves", "disproved",
];

/// Outcome of ranking evidence for one claim
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub supporting: Vec<EvidenceItem>,
    pub refuting: Vec<EvidenceItem>,
    pub score: f64,
    pub label: Label,
}

impl Ranking {
    /// No usable evidence
    pub fn empty() -> Self {
        Self {
            supporting: Vec::new(),
            refuting: Vec::new(),
            score: 0.0,
            label: Label::Nei,
        }
    }
}

/// Corpus statistics over the evidence documents of one claim
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub avg_doc_len: f64,
    pub doc_freq: HashMap<String, usize>,
    pub doc_count: usize,
}

impl CorpusStats {
    pub fn from_docs(docs: &[Vec<String>]) -> Self {
        if docs.is_empty() {
            return Self::default();
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;
        for doc in docs {
            total_len += doc.len();
            let unique: HashSet<&String> = doc.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        Self {
            avg_doc_len: total_len as f64 / docs.len() as f64,
            doc_freq,
            doc_count: docs.len(),
        }
    }

    /// Smoothed inverse document frequency, `df` floored at 1
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freq.get(term).copied().unwrap_or(0).max(1) as f64;
        let n = self.doc_count as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}

/// Tokens of an evidence document (title followed by snippet)
pub fn document_tokens(item: &EvidenceItem) -> Vec<String> {
    let title = item.title.trim();
    let snippet = item.snippet_text().trim();
    let text = match (title.is_empty(), snippet.is_empty()) {
        (false, false) => format!("{} {}", title, snippet),
        (false, true) => title.to_string(),
        (true, _) => snippet.to_string(),
    };
    tokenize(&text)
}

/// BM25 score of `doc` for `query`
pub fn bm25(query: &[String], doc: &[String], stats: &CorpusStats) -> f64 {
    if query.is_empty() || doc.is_empty() {
        return 0.0;
    }

    let mut tf: HashMap<&str, usize> = HashMap::new();
    for term in doc {
        *tf.entry(term.as_str()).or_insert(0) += 1;
    }

    let avg_len = if stats.avg_doc_len > 0.0 {
        stats.avg_doc_len
    } else {
        1.0
    };
    let length_norm = 1.0 - BM25_B + BM25_B * (doc.len() as f64 / avg_len);

    let score: f64 = query
        .iter()
        .filter_map(|term| {
            let freq = *tf.get(term.as_str())? as f64;
            let idf = stats.idf(term);
            Some(idf * (freq * (BM25_K1 + 1.0)) / (freq + BM25_K1 * length_norm))
        })
        .sum();

    score.max(0.0)
}

/// Jaccard overlap of the two token sets
pub fn jaccard(query: &[String], doc: &[String]) -> f64 {
    if query.is_empty() || doc.is_empty() {
        return 0.0;
    }
    let q: HashSet<&String> = query.iter().collect();
    let d: HashSet<&String> = doc.iter().collect();
    let union = q.union(&d).count();
    if union == 0 {
        return 0.0;
    }
    q.intersection(&d).count() as f64 / union as f64
}

/// Blended similarity: `0.8 * BM25 + 0.2 * Jaccard`
pub fn similarity(query: &[String], doc: &[String], stats: &CorpusStats) -> f64 {
    if query.is_empty() || doc.is_empty() {
        return 0.0;
    }
    BM25_WEIGHT * bm25(query, doc, stats) + (1.0 - BM25_WEIGHT) * jaccard(query, doc)
}

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

/// Heuristic stance of an item towards the claim.
///
/// Cues are matched as substrings of the lower-cased text, so "no" also
/// fires inside "know".
pub fn stance(claim: &str, item: &EvidenceItem) -> f64 {
    let claim = claim.trim().to_lowercase();
    let title = item.title.trim().to_lowercase();
    let snippet = item.snippet_text().trim().to_lowercase();

    let cued = |cues: &[&str]| contains_any(&title, cues) || contains_any(&snippet, cues);

    if cued(CONTRADICTION_CUES) {
        return CONTRADICTION_STANCE;
    }

    if contains_any(&claim, NEGATION_CUES) == cued(NEGATION_CUES) {
        POLARITY_STANCE
    } else {
        -POLARITY_STANCE
    }
}

/// Score every item against the claim
pub fn score_items(claim: &str, items: &[EvidenceItem]) -> Vec<ScoredEvidence> {
    let docs: Vec<Vec<String>> = items.iter().map(document_tokens).collect();
    let stats = CorpusStats::from_docs(&docs);
    let query = tokenize(claim.trim());

    items
        .iter()
        .zip(&docs)
        .map(|(item, doc)| {
            let sim = similarity(&query, doc, &stats);
            ScoredEvidence::new(item.clone(), sim, stance(claim, item))
        })
        .collect()
}

fn by_direction<F>(directional: F) -> impl Fn(&ScoredEvidence, &ScoredEvidence) -> Ordering
where
    F: Fn(&ScoredEvidence) -> f64,
{
    move |a, b| {
        directional(b)
            .total_cmp(&directional(a))
            .then_with(|| b.similarity.total_cmp(&a.similarity))
    }
}

/// Decide the label from the kept directional sums
pub fn decide_label(support_sum: f64, refute_sum: f64, kept_support: usize, kept_refute: usize) -> Label {
    if kept_support > 0 && support_sum >= LABEL_FLOOR.max(LABEL_MARGIN * refute_sum) {
        Label::Supported
    } else if kept_refute > 0 && refute_sum >= LABEL_FLOOR.max(LABEL_MARGIN * support_sum) {
        Label::Refuted
    } else {
        Label::Nei
    }
}

/// Rank evidence for a claim and decide its label.
///
/// Supporting and refuting lists are capped at `top_k_support` and
/// `top_k_refute`. The score is the kept support sum minus the kept
/// refute sum. Returned items carry `similarity * |stance|` as score.
pub fn rank(claim: &str, evidence: &[EvidenceItem], top_k_support: usize, top_k_refute: usize) -> Ranking {
    if claim.is_empty() || evidence.is_empty() {
        return Ranking::empty();
    }

    let scored = score_items(claim, evidence);

    let (mut support, mut refute): (Vec<ScoredEvidence>, Vec<ScoredEvidence>) = (
        scored.iter().filter(|s| s.support_score > 0.0).cloned().collect(),
        scored.iter().filter(|s| s.refute_score > 0.0).cloned().collect(),
    );

    support.sort_by(by_direction(|s: &ScoredEvidence| s.support_score));
    refute.sort_by(by_direction(|s: &ScoredEvidence| s.refute_score));
    support.truncate(top_k_support);
    refute.truncate(top_k_refute);

    let support_sum: f64 = support.iter().map(|s| s.support_score).sum();
    let refute_sum: f64 = refute.iter().map(|s| s.refute_score).sum();
    let label = decide_label(support_sum, refute_sum, support.len(), refute.len());

    Ranking {
        supporting: support.into_iter().map(ScoredEvidence::into_item).collect(),
        refuting: refute.into_iter().map(ScoredEvidence::into_item).collect(),
        score: support_sum - refute_sum,
        label,
    }
}

/// Aggregate score from already separated lists: `Σ score − Σ score`
pub fn score_evidence(supporting: &[EvidenceItem], refuting: &[EvidenceItem]) -> f64 {
    let support: f64 = supporting.iter().map(|i| i.score).sum();
    let refute: f64 = refuting.iter().map(|i| i.score).sum();
    support - refute
}
