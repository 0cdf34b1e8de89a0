//! Keyless backend using the Wikipedia opensearch API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use super::{http_client, rank_score, EvidenceProvider, ProviderError};
use crate::domain::EvidenceItem;

/// Wikipedia search client for one language edition
pub struct WikipediaProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl WikipediaProvider {
    /// Client for `https://{language}.wikipedia.org`
    pub fn new(language: &str, timeout: Duration) -> Self {
        let language = match language.trim() {
            "" => "en",
            lang => lang,
        };
        Self::with_endpoint(
            format!("https://{}.wikipedia.org/w/api.php", language),
            timeout,
        )
    }

    /// Client for an arbitrary MediaWiki `api.php` endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: http_client(timeout),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Map an opensearch body `[query, [titles], [descriptions], [urls]]`
/// to evidence items
pub fn parse_opensearch(body: &str) -> Result<Vec<EvidenceItem>, ProviderError> {
    let parse_error = |message: String| ProviderError::Parse {
        provider: "wikipedia".to_string(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;
    let parts = value
        .as_array()
        .ok_or_else(|| parse_error("expected a JSON array".to_string()))?;

    let column = |index: usize| -> Vec<String> {
        parts
            .get(index)
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    };

    let titles = column(1);
    let descriptions = column(2);
    let urls = column(3);

    let items = titles
        .into_iter()
        .zip(urls)
        .enumerate()
        .filter(|(_, (title, url))| !title.trim().is_empty() && !url.trim().is_empty())
        .enumerate()
        .map(|(rank, (position, (title, url)))| {
            let mut item = EvidenceItem::new(title, url)
                .with_score(rank_score(rank))
                .with_source("wikipedia")
                .with_metadata(serde_json::json!({ "rank": rank + 1 }));
            item.snippet = descriptions
                .get(position)
                .filter(|d| !d.trim().is_empty())
                .cloned();
            item
        })
        .collect();

    Ok(items)
}

#[async_trait]
impl EvidenceProvider for WikipediaProvider {
    fn name(&self) -> &str {
        "wikipedia"
    }

    #[instrument(skip(self), fields(provider = "wikipedia"))]
    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        let limit_param = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "opensearch"),
                ("search", query),
                ("limit", limit_param.as_str()),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: "wikipedia".to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_opensearch(&body)
    }
}
