//! Search query formulation for claim sentences.

/// Longest query sent to a provider, in words
pub const MAX_QUERY_WORDS: usize = 20;

const QUOTES: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '`'];
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Turn a claim sentence into a web search query.
///
/// Quotes at word boundaries are removed, so apostrophes inside words
/// ("isn't") survive. A trailing period is dropped, whitespace is
/// collapsed and the result is capped at [`MAX_QUERY_WORDS`] words.
pub fn formulate_query(claim: &str) -> String {
    let mut words: Vec<String> = claim
        .split_whitespace()
        .map(unquote)
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(last) = words.last_mut() {
        if last.ends_with('.') {
            last.pop();
        }
    }
    if words.last().is_some_and(|w| w.is_empty()) {
        words.pop();
    }

    words.truncate(MAX_QUERY_WORDS);
    words.join(" ")
}

/// Strip quotes from both ends of a word, including a closing quote
/// that sits before trailing punctuation (`"true".`).
fn unquote(word: &str) -> String {
    let word = word.trim_matches(QUOTES);
    let core = word.trim_end_matches(TRAILING_PUNCT);
    let tail = &word[core.len()..];
    format!("{}{}", core.trim_end_matches(QUOTES), tail)
}
