//! Provider selection from configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    BingProvider, CompositeProvider, DuckDuckGoProvider, EvidenceProvider, WikipediaProvider,
};
use crate::config::SearchSettings;

/// Requested search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMode {
    /// Keyed backend when a key is present, keyless composite otherwise
    Auto,

    /// Keyed Bing-compatible backend
    Bing,

    /// DuckDuckGo HTML scraper only
    #[serde(alias = "ddg")]
    DuckDuckGo,

    /// Wikipedia search only
    #[serde(alias = "wiki")]
    Wikipedia,
}

impl Default for ProviderMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl ProviderMode {
    /// Parse a mode name; unknown names fall back to `Auto`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => ProviderMode::Auto,
            "bing" | "keyed" => ProviderMode::Bing,
            "duckduckgo" | "ddg" => ProviderMode::DuckDuckGo,
            "wikipedia" | "wiki" => ProviderMode::Wikipedia,
            other => {
                warn!(mode = other, "Unknown search provider, using auto");
                ProviderMode::Auto
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Auto => "auto",
            ProviderMode::Bing => "bing",
            ProviderMode::DuckDuckGo => "duckduckgo",
            ProviderMode::Wikipedia => "wikipedia",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the evidence provider for the given settings.
///
/// Never fails: when the keyed backend is requested but unusable, the
/// keyless composite is returned instead.
pub fn select_provider(settings: &SearchSettings) -> Arc<dyn EvidenceProvider> {
    let timeout = settings.timeout();

    let provider: Arc<dyn EvidenceProvider> = match settings.provider {
        ProviderMode::DuckDuckGo => Arc::new(DuckDuckGoProvider::new(timeout)),
        ProviderMode::Wikipedia => Arc::new(WikipediaProvider::new(
            &settings.wikipedia_language,
            timeout,
        )),
        ProviderMode::Bing | ProviderMode::Auto => match settings.api_key() {
            Some(key) => match BingProvider::new(key, settings.endpoint.clone(), timeout) {
                Ok(bing) => Arc::new(bing),
                Err(e) => {
                    warn!(error = %e, "Keyed search unavailable, using keyless providers");
                    keyless_composite(settings)
                }
            },
            None => {
                if settings.provider == ProviderMode::Bing {
                    warn!("No search API key configured, using keyless providers");
                }
                keyless_composite(settings)
            }
        },
    };

    info!(
        mode = %settings.provider,
        provider = provider.name(),
        "Selected evidence provider"
    );
    provider
}

fn keyless_composite(settings: &SearchSettings) -> Arc<dyn EvidenceProvider> {
    let timeout = settings.timeout();
    Arc::new(CompositeProvider::new(vec![
        Arc::new(DuckDuckGoProvider::new(timeout)),
        Arc::new(WikipediaProvider::new(&settings.wikipedia_language, timeout)),
    ]))
}
