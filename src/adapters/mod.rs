//! Evidence providers for external search backends.
//!
//! Every backend implements `EvidenceProvider`. Backends report failures
//! through `try_search`; callers use `search`, which never fails and
//! degrades any error to an empty list.

pub mod bing;
pub mod composite;
pub mod duckduckgo;
pub mod selector;
pub mod wikipedia;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::EvidenceItem;

pub use bing::BingProvider;
pub use composite::CompositeProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use selector::{select_provider, ProviderMode};
pub use wikipedia::WikipediaProvider;

/// User agent sent to every backend
pub const USER_AGENT: &str = concat!("claimcheck/", env!("CARGO_PKG_VERSION"));

/// Errors raised inside a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {provider}")]
    Status { provider: String, status: u16 },

    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Trait for evidence search backends
#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run a search, reporting failures
    async fn try_search(&self, query: &str, limit: usize)
        -> Result<Vec<EvidenceItem>, ProviderError>;

    /// Run a search; failures become an empty list
    async fn search(&self, query: &str, limit: usize) -> Vec<EvidenceItem> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        match self.try_search(query, limit).await {
            Ok(items) => {
                let items = normalize_items(items, limit);
                debug!(provider = self.name(), count = items.len(), "Search returned");
                items
            }
            Err(e) => {
                warn!(provider = self.name(), error = %e, "Search failed, using no evidence");
                Vec::new()
            }
        }
    }
}

/// Drop items without a title or url, trim fields, and cap at `limit`
pub fn normalize_items(items: Vec<EvidenceItem>, limit: usize) -> Vec<EvidenceItem> {
    items
        .into_iter()
        .filter(EvidenceItem::is_valid)
        .map(|mut item| {
            item.title = item.title.trim().to_string();
            item.url = item.url.trim().to_string();
            item.snippet = item
                .snippet
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            item
        })
        .take(limit)
        .collect()
}

/// Build an HTTP client with a bounded per-request timeout
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Rank-based score: 1 / (rank + 1)
pub fn rank_score(rank: usize) -> f64 {
    1.0 / (rank as f64 + 1.0)
}
