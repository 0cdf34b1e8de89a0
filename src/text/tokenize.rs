//! Token normalization shared by the ranker.

/// Words carrying no retrieval signal
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "or", "the", "to", "of", "in", "on", "for", "with", "by", "is", "are", "was",
    "were", "be", "been", "being", "as", "at", "from", "that", "this", "it", "its", "their", "his",
    "her", "they", "them", "we", "you", "your", "i", "me", "my", "our", "ours", "but", "if", "then",
    "so", "than", "too", "very", "can", "could", "should", "would", "will", "may", "might", "not",
    "no",
];

/// Check whether a lower-cased word is a stop word
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Split text into lower-cased ASCII alphanumeric runs, without filtering
pub fn raw_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Tokenize for matching: stop words removed, and only tokens longer than
/// two characters or made entirely of digits are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    raw_tokens(text)
        .filter(|t| !is_stopword(t) && (t.len() > 2 || t.bytes().all(|b| b.is_ascii_digit())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_filters_stopwords_and_short_tokens() {
        let tokens = tokenize("The Earth is round, as of 2024 at 9 AM.");
        assert_eq!(tokens, vec!["earth", "round", "2024", "9"]);
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let tokens = tokenize("flat-earth myth's origins");
        assert_eq!(tokens, vec!["flat", "earth", "myth", "origins"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ...  ").is_empty());
    }
}
