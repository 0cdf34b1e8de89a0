//! Keyless backend scraping the DuckDuckGo HTML results page.
//!
//! Extraction is best effort. When the markup changes the provider
//! returns whatever it can still recognize, possibly nothing.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use super::{http_client, rank_score, EvidenceProvider, ProviderError};
use crate::domain::EvidenceItem;

/// HTML results endpoint
pub const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static TITLE_ANCHOR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\s([^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#).ok()
});
static SNIPPET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(?:a|div|td|span)\s[^>]*class="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td|span)>"#)
        .ok()
});
static HREF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).ok());
static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());
static NUMERIC_ENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").ok());

/// DuckDuckGo HTML scraper
pub struct DuckDuckGoProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, timeout)
    }

    /// Point the scraper at a different results page
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: http_client(timeout),
        }
    }
}

struct RawResult {
    position: usize,
    title: String,
    url: String,
    snippet: Option<String>,
}

/// Extract results from a results page
pub fn parse_results_page(html: &str) -> Vec<EvidenceItem> {
    let (Some(title_re), Some(snippet_re), Some(href_re)) =
        (TITLE_ANCHOR.as_ref(), SNIPPET.as_ref(), HREF.as_ref())
    else {
        return Vec::new();
    };

    let mut results: Vec<RawResult> = title_re
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(1)?.as_str();
            let href = href_re.captures(attrs)?.get(1)?.as_str();
            let url = resolve_link(&decode_entities(href))?;
            Some(RawResult {
                position: whole.start(),
                title: clean_text(caps.get(2)?.as_str()),
                url,
                snippet: None,
            })
        })
        .collect();

    // Attach each snippet to the closest preceding result
    for caps in snippet_re.captures_iter(html) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let owner = results
            .iter_mut()
            .rev()
            .find(|r| r.position < whole.start());
        if let Some(result) = owner {
            if result.snippet.is_none() {
                result.snippet = Some(clean_text(body.as_str()));
            }
        }
    }

    results
        .into_iter()
        .filter(|r| !r.title.is_empty())
        .enumerate()
        .map(|(rank, r)| {
            let mut item = EvidenceItem::new(r.title, r.url)
                .with_score(rank_score(rank))
                .with_source("duckduckgo")
                .with_metadata(serde_json::json!({ "rank": rank + 1 }));
            item.snippet = r.snippet.filter(|s| !s.is_empty());
            item
        })
        .collect()
}

/// Resolve a result href to the target URL, unwrapping redirect links
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());

    match target {
        Some(target) => Some(target),
        None if parsed.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) => None,
        None => Some(absolute),
    }
}

/// Strip tags, decode entities and collapse whitespace
fn clean_text(fragment: &str) -> String {
    let without_tags = match TAG.as_ref() {
        Some(tag) => tag.replace_all(fragment, " ").into_owned(),
        None => fragment.to_string(),
    };
    decode_entities(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    decode_numeric_entities(text)
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// `&#NNN;` and `&#xHH;` references; invalid code points are left as written
fn decode_numeric_entities(text: &str) -> String {
    let Some(entity) = NUMERIC_ENTITY.as_ref() else {
        return text.to_string();
    };
    entity
        .replace_all(text, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(dec)) => dec.as_str().parse().ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[async_trait]
impl EvidenceProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    #[instrument(skip(self), fields(provider = "duckduckgo"))]
    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: "duckduckgo".to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let mut items = parse_results_page(&html);
        debug!(found = items.len(), "Parsed results page");
        items.truncate(limit);
        Ok(items)
    }
}
