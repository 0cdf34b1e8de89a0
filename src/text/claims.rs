//! Heuristic claim detection.
//!
//! A sentence is treated as a claim when it reads like an assertion:
//! it carries an assertive or modal verb, mentions numbers or proper
//! nouns, and ends like a statement. Questions and imperatives are never
//! claims.

/// Verbs that signal an assertion
const ASSERTIVE_VERBS: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "will", "would",
    "can", "could", "should", "must", "may", "might", "shall", "do", "does", "did", "claims",
    "claimed", "states", "stated", "shows", "showed", "shown", "found", "finds", "proves",
    "proved", "reported", "announced", "contains", "contained", "causes", "caused", "leads", "led",
    "remains", "became", "becomes", "won", "holds", "equals", "includes", "included", "produces",
    "produced", "reached", "killed", "born", "died", "founded",
];

/// Leading words that make a sentence a question or an instruction
const QUESTION_LEADS: &[&str] = &[
    "what", "who", "whom", "whose", "which", "when", "where", "why", "how", "please", "imagine",
    "consider", "suppose", "let", "let's", "lets", "tell", "show", "give", "list", "explain",
    "describe",
];

/// Leading words that hedge a statement as hearsay
const REPORTING_LEADS: &[&str] = &[
    "according", "reportedly", "allegedly", "supposedly", "apparently", "rumor", "rumour",
    "rumors", "rumours",
];

/// Characters stripped from both ends before analysis
const WRAPPERS: &[char] = &[
    '"', '\'', '“', '”', '‘', '’', '«', '»', '(', ')', '[', ']', '{', '}',
];

/// Sentence-level claim classifier
#[derive(Debug, Clone)]
pub struct ClaimDetector {
    /// Sentences shorter than this (in chars) are rejected
    pub min_chars: usize,

    /// Sentences longer than this (in chars) are rejected
    pub max_chars: usize,

    /// Minimum cue score for a claim
    pub threshold: i32,
}

impl Default for ClaimDetector {
    fn default() -> Self {
        Self {
            min_chars: 6,
            max_chars: 2000,
            threshold: 2,
        }
    }
}

impl ClaimDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether one sentence is a checkable claim
    pub fn detect(&self, sentence: &str) -> bool {
        self.score(sentence)
            .map(|score| score >= self.threshold)
            .unwrap_or(false)
    }

    /// Apply `detect` to each sentence independently, preserving order
    pub fn detect_all<S: AsRef<str>>(&self, sentences: &[S]) -> Vec<bool> {
        sentences.iter().map(|s| self.detect(s.as_ref())).collect()
    }

    /// Cue score, or `None` when the sentence is rejected outright
    pub fn score(&self, sentence: &str) -> Option<i32> {
        let trimmed = sentence.trim();
        let length = trimmed.chars().count();
        if length < self.min_chars || length > self.max_chars {
            return None;
        }

        let core = trimmed.trim_matches(|c: char| WRAPPERS.contains(&c) || c.is_whitespace());
        if core.is_empty() || core.ends_with('?') {
            return None;
        }

        let tokens: Vec<&str> = core
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .collect();
        let first = tokens.first()?.to_lowercase();
        if QUESTION_LEADS.contains(&first.as_str()) {
            return None;
        }

        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let mut score = 0;

        if lowered.iter().any(|t| ASSERTIVE_VERBS.contains(&t.as_str())) {
            score += 2;
        }

        let numeric = tokens.iter().any(|t| is_numeric(t));
        let entity = tokens.iter().skip(1).any(|t| looks_like_entity(t));
        if numeric || entity {
            score += 1;
        }

        if core.ends_with(['.', '!', '…']) {
            score += 1;
        }

        if REPORTING_LEADS.contains(&first.as_str()) {
            score -= 1;
        }

        Some(score)
    }
}

fn is_numeric(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Capitalized or all-caps word (proper noun or acronym)
fn looks_like_entity(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if token.chars().count() < 2 || !first.is_alphabetic() {
        return false;
    }
    first.is_uppercase()
        || token
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
}
