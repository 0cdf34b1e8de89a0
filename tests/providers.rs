//! Provider Integration Tests
//!
//! Tests for provider fallback, normalization and selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use claimcheck::adapters::{
    select_provider, BingProvider, CompositeProvider, DuckDuckGoProvider, EvidenceProvider,
    ProviderError, ProviderMode, WikipediaProvider,
};
use claimcheck::config::SearchSettings;
use claimcheck::domain::EvidenceItem;

/// Always fails with an HTTP status error
struct Failing {
    calls: AtomicUsize,
}

#[async_trait]
impl EvidenceProvider for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn try_search(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Status {
            provider: "failing".to_string(),
            status: 503,
        })
    }
}

/// Returns the given items verbatim
struct Canned {
    items: Vec<EvidenceItem>,
}

#[async_trait]
impl EvidenceProvider for Canned {
    fn name(&self) -> &str {
        "canned"
    }

    async fn try_search(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<EvidenceItem>, ProviderError> {
        Ok(self.items.clone())
    }
}

fn canned(urls: &[&str]) -> Arc<Canned> {
    Arc::new(Canned {
        items: urls
            .iter()
            .map(|u| EvidenceItem::new(format!("Result {}", u), *u).with_snippet("snippet"))
            .collect(),
    })
}

#[tokio::test]
async fn test_failing_backend_falls_through() {
    let failing = Arc::new(Failing {
        calls: AtomicUsize::new(0),
    });
    let working = canned(&["https://a", "https://b"]);
    let composite = CompositeProvider::new(vec![failing.clone(), working]);

    let items = composite.search("earth", 5).await;

    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a", "https://b"]);
}

#[tokio::test]
async fn test_all_backends_failing_is_empty() {
    let composite = CompositeProvider::new(vec![
        Arc::new(Failing {
            calls: AtomicUsize::new(0),
        }),
        Arc::new(Failing {
            calls: AtomicUsize::new(0),
        }),
    ]);

    assert!(composite.search("earth", 5).await.is_empty());
    assert!(composite.try_search("earth", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_items_never_returned() {
    let provider = Canned {
        items: vec![
            EvidenceItem::new("", "https://no-title"),
            EvidenceItem::new("No url", ""),
            EvidenceItem::new("   ", "https://blank-title"),
            EvidenceItem::new("  Kept  ", "  https://kept  ").with_snippet("   "),
        ],
    };

    let items = provider.search("earth", 10).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Kept");
    assert_eq!(items[0].url, "https://kept");
    assert_eq!(items[0].snippet, None);
}

#[tokio::test]
async fn test_search_respects_limit() {
    let provider = canned(&["https://a", "https://b", "https://c", "https://d"]);

    assert_eq!(provider.search("earth", 2).await.len(), 2);
    assert!(provider.search("earth", 0).await.is_empty());
    assert!(provider.search("   ", 3).await.is_empty());
}

#[tokio::test]
async fn test_unreachable_backends_degrade() {
    let timeout = Duration::from_secs(2);
    let providers: Vec<Arc<dyn EvidenceProvider>> = vec![
        Arc::new(
            BingProvider::new("key", Some("http://127.0.0.1:9/search".to_string()), timeout)
                .unwrap(),
        ),
        Arc::new(DuckDuckGoProvider::with_endpoint("http://127.0.0.1:9/html/", timeout)),
        Arc::new(WikipediaProvider::with_endpoint("http://127.0.0.1:9/w/api.php", timeout)),
    ];

    for provider in providers {
        assert!(provider.try_search("earth", 3).await.is_err(), "{}", provider.name());
        assert!(provider.search("earth", 3).await.is_empty(), "{}", provider.name());
    }
}

#[tokio::test]
async fn test_hung_backend_times_out_empty() {
    // accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let provider = WikipediaProvider::with_endpoint(
        format!("http://{}/w/api.php", addr),
        Duration::from_millis(300),
    );

    let started = Instant::now();
    let items = tokio::time::timeout(Duration::from_secs(5), provider.search("earth", 3))
        .await
        .expect("search did not honor its timeout");

    assert!(items.is_empty());
    assert!(started.elapsed() < Duration::from_secs(2));
    server.abort();
}

#[test]
fn test_keyed_backend_requires_key() {
    let result = BingProvider::new("", None, Duration::from_secs(1));
    assert!(matches!(result, Err(ProviderError::MissingCredential(_))));
}

#[test]
fn test_selection_never_fails() {
    let settings = SearchSettings {
        provider: ProviderMode::parse("something-else"),
        api_key: None,
        ..Default::default()
    };

    let provider = select_provider(&settings);
    assert_eq!(provider.name(), "composite(duckduckgo+wikipedia)");
}
