//! Provider that chains several backends.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{normalize_items, EvidenceProvider, ProviderError};
use crate::domain::EvidenceItem;

/// Queries backends in order, de-duplicating by URL, until `limit`
/// unique items are collected or every backend has been tried.
///
/// A failing backend is logged and skipped.
pub struct CompositeProvider {
    name: String,
    backends: Vec<Arc<dyn EvidenceProvider>>,
}

impl CompositeProvider {
    pub fn new(backends: Vec<Arc<dyn EvidenceProvider>>) -> Self {
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        Self {
            name: format!("composite({})", names.join("+")),
            backends,
        }
    }

    pub fn backends(&self) -> &[Arc<dyn EvidenceProvider>] {
        &self.backends
    }
}

#[async_trait]
impl EvidenceProvider for CompositeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut collected = Vec::with_capacity(limit);

        for backend in &self.backends {
            if collected.len() >= limit {
                break;
            }

            let items = match backend.try_search(query, limit).await {
                Ok(items) => normalize_items(items, usize::MAX),
                Err(e) => {
                    warn!(
                        provider = backend.name(),
                        error = %e,
                        "Backend failed, trying next"
                    );
                    continue;
                }
            };

            let before = collected.len();
            for item in items {
                if collected.len() >= limit {
                    break;
                }
                if seen.insert(item.url.clone()) {
                    collected.push(item);
                }
            }
            debug!(
                provider = backend.name(),
                added = collected.len() - before,
                total = collected.len(),
                "Backend contributed"
            );
        }

        Ok(collected)
    }
}
