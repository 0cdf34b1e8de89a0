//! Keyed web search backend speaking the Bing Web Search v7 API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::{http_client, rank_score, EvidenceProvider, ProviderError};
use crate::domain::EvidenceItem;

/// Default Bing Web Search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(default, rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Bing-compatible search client
pub struct BingProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for BingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BingProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl BingProvider {
    /// Create a client; both key and endpoint must be non-empty
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ProviderError::MissingCredential("search API key"));
        }

        let endpoint = endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim()
            .to_string();
        if endpoint.is_empty() {
            return Err(ProviderError::MissingCredential("search endpoint"));
        }

        Ok(Self {
            api_key,
            endpoint,
            client: http_client(timeout),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Map a Bing JSON body to evidence items, scored by rank
pub fn parse_response(body: &str) -> Result<Vec<EvidenceItem>, ProviderError> {
    let response: BingResponse = serde_json::from_str(body).map_err(|e| ProviderError::Parse {
        provider: "bing".to_string(),
        message: e.to_string(),
    })?;

    let pages = response.web_pages.map(|p| p.value).unwrap_or_default();
    let items = pages
        .into_iter()
        .filter(|page| !page.name.trim().is_empty() && !page.url.trim().is_empty())
        .enumerate()
        .map(|(rank, page)| {
            let mut item = EvidenceItem::new(page.name, page.url)
                .with_score(rank_score(rank))
                .with_source("bing")
                .with_metadata(serde_json::json!({ "rank": rank + 1 }));
            item.snippet = page.snippet;
            item
        })
        .collect();

    Ok(items)
}

#[async_trait]
impl EvidenceProvider for BingProvider {
    fn name(&self) -> &str {
        "bing"
    }

    #[instrument(skip(self), fields(provider = "bing"))]
    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        let count = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[("q", query), ("count", count.as_str()), ("textDecorations", "false")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: "bing".to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "_type": "SearchResponse",
        "webPages": {
            "value": [
                {"name": "Paris - Wikipedia", "url": "https://en.wikipedia.org/wiki/Paris", "snippet": "Paris is the capital of France."},
                {"name": "", "url": "https://untitled.example"},
                {"name": "Visit Paris", "url": "https://visit.example", "snippet": "Guide"}
            ]
        }
    }"#;

    #[test]
    fn test_requires_key() {
        let result = BingProvider::new("  ", None, Duration::from_secs(1));
        assert!(matches!(result, Err(ProviderError::MissingCredential(_))));
    }

    #[test]
    fn test_requires_endpoint() {
        let result = BingProvider::new("key", Some(" ".to_string()), Duration::from_secs(1));
        assert!(matches!(result, Err(ProviderError::MissingCredential(_))));
    }

    #[test]
    fn test_default_endpoint() {
        let provider = BingProvider::new("key", None, Duration::from_secs(1)).unwrap();
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert!(!format!("{:?}", provider).contains("api_key"));
    }

    #[test]
    fn test_parse_scores_by_rank() {
        let items = parse_response(SAMPLE).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Paris - Wikipedia");
        assert_eq!(items[0].score, 1.0);
        assert_eq!(items[1].title, "Visit Paris");
        assert_eq!(items[1].score, 0.5);
        assert_eq!(items[1].source.as_deref(), Some("bing"));
    }

    #[test]
    fn test_parse_without_web_pages() {
        assert!(parse_response(r#"{"_type":"SearchResponse"}"#).unwrap().is_empty());
        assert!(parse_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades() {
        let provider = BingProvider::new(
            "key",
            Some("http://127.0.0.1:9/search".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(provider.search("Paris", 5).await.is_empty());
    }
}
