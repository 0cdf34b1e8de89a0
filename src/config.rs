//! Configuration for claimcheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SEARCH_PROVIDER, BING_API_KEY / SEARCH_API_KEY,
//!    SEARCH_ENDPOINT, CLAIMCHECK_*)
//! 2. Config file (.claimcheck/config.yaml, or an explicit path)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .claimcheck/config.yaml
//! - Falls back to the user config directory (claimcheck/config.yaml)
//!
//! Settings are resolved once and handed to the orchestrator at
//! construction; nothing here is read per request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::adapters::ProviderMode;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub wikipedia_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    pub max_concurrency: Option<usize>,
    pub heartbeat_interval_ms: Option<u64>,
    pub channel_capacity: Option<usize>,
    pub max_input_bytes: Option<usize>,
}

/// Search provider settings
#[derive(Clone)]
pub struct SearchSettings {
    /// Requested provider mode
    pub provider: ProviderMode,
    /// API key for the keyed backend
    pub api_key: Option<String>,
    /// Custom endpoint for the keyed backend
    pub endpoint: Option<String>,
    /// Per-request network timeout
    pub timeout_seconds: u64,
    /// Wikipedia language edition
    pub wikipedia_language: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: ProviderMode::Auto,
            api_key: None,
            endpoint: None,
            timeout_seconds: 10,
            wikipedia_language: "en".to_string(),
        }
    }
}

impl std::fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSettings")
            .field("provider", &self.provider)
            .field("has_api_key", &self.api_key().is_some())
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("wikipedia_language", &self.wikipedia_language)
            .finish()
    }
}

impl SearchSettings {
    /// The API key, if present and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// Pipeline execution settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Claims retrieved concurrently per request
    pub max_concurrency: usize,
    /// Idle gap before a keep-alive frame is emitted
    pub heartbeat_interval_ms: u64,
    /// Bounded stream channel capacity
    pub channel_capacity: usize,
    /// Largest accepted input text
    pub max_input_bytes: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            heartbeat_interval_ms: 10_000,
            channel_capacity: 32,
            max_input_bytes: 1_048_576, // 1MB
        }
    }
}

impl PipelineSettings {
    /// Keep-alive gap, floored at 10 ms
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(10))
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub search: SearchSettings,
    pub pipeline: PipelineSettings,
    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from the environment and the discovered config file
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Resolve settings, using `path` instead of discovery when given
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        let file = match config_file {
            Some(ref path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        let mut settings = Self::from_file(&file);
        settings.config_file = config_file;
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Settings from a parsed config file on top of defaults
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut settings = Self::default();

        if let Some(search) = &file.search {
            if let Some(provider) = &search.provider {
                settings.search.provider = ProviderMode::parse(provider);
            }
            settings.search.api_key = search.api_key.clone();
            settings.search.endpoint = search.endpoint.clone();
            if let Some(timeout) = search.timeout_seconds {
                settings.search.timeout_seconds = timeout;
            }
            if let Some(lang) = &search.wikipedia_language {
                settings.search.wikipedia_language = lang.clone();
            }
        }

        if let Some(pipeline) = &file.pipeline {
            let defaults = PipelineSettings::default();
            settings.pipeline = PipelineSettings {
                max_concurrency: pipeline.max_concurrency.unwrap_or(defaults.max_concurrency),
                heartbeat_interval_ms: pipeline
                    .heartbeat_interval_ms
                    .unwrap_or(defaults.heartbeat_interval_ms),
                channel_capacity: pipeline.channel_capacity.unwrap_or(defaults.channel_capacity),
                max_input_bytes: pipeline.max_input_bytes.unwrap_or(defaults.max_input_bytes),
            };
        }

        settings
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("SEARCH_PROVIDER") {
            self.search.provider = ProviderMode::parse(&provider);
        }

        let key = lookup("BING_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup("SEARCH_API_KEY").filter(|k| !k.trim().is_empty()));
        if key.is_some() {
            self.search.api_key = key;
        }

        if let Some(endpoint) = lookup("SEARCH_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            self.search.endpoint = Some(endpoint);
        }

        if let Some(timeout) = parse_env(&lookup, "CLAIMCHECK_SEARCH_TIMEOUT_SECONDS") {
            self.search.timeout_seconds = timeout;
        }
        if let Some(concurrency) = parse_env(&lookup, "CLAIMCHECK_MAX_CONCURRENCY") {
            self.pipeline.max_concurrency = concurrency;
        }
        if let Some(interval) = parse_env(&lookup, "CLAIMCHECK_HEARTBEAT_INTERVAL_MS") {
            self.pipeline.heartbeat_interval_ms = interval;
        }
    }

    /// Log the effective configuration (the API key itself is never logged)
    pub fn log_snapshot(&self) {
        info!(
            search_provider = %self.search.provider,
            has_api_key = self.search.api_key().is_some(),
            custom_endpoint = self.search.endpoint.is_some(),
            search_timeout_seconds = self.search.timeout_seconds,
            wikipedia_language = %self.search.wikipedia_language,
            max_concurrency = self.pipeline.max_concurrency,
            heartbeat_interval_ms = self.pipeline.heartbeat_interval_ms,
            config_file = ?self.config_file,
            "Effective configuration"
        );
    }
}

fn parse_env<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name).and_then(|raw| raw.trim().parse().ok())
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".claimcheck").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("claimcheck").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.search.provider, ProviderMode::Auto);
        assert_eq!(settings.search.timeout(), Duration::from_secs(10));
        assert_eq!(settings.pipeline.heartbeat_interval(), Duration::from_secs(10));
        assert_eq!(settings.pipeline.max_concurrency, 4);
        assert!(settings.search.api_key().is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".claimcheck");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
search:
  provider: wikipedia
  timeout_seconds: 3
  wikipedia_language: fr
pipeline:
  max_concurrency: 2
  heartbeat_interval_ms: 500
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("1.0"));

        let settings = Settings::from_file(&parsed);
        assert_eq!(settings.search.provider, ProviderMode::Wikipedia);
        assert_eq!(settings.search.timeout_seconds, 3);
        assert_eq!(settings.search.wikipedia_language, "fr");
        assert_eq!(settings.pipeline.max_concurrency, 2);
        assert_eq!(settings.pipeline.heartbeat_interval_ms, 500);
        assert_eq!(settings.pipeline.channel_capacity, 32);
    }

    #[test]
    fn test_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.yaml");
        std::fs::write(&config_path, "search:\n  provider: duckduckgo\n").unwrap();

        let settings = Settings::load_from(Some(&config_path)).unwrap();
        assert_eq!(settings.config_file.as_deref(), Some(config_path.as_path()));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("broken.yaml");
        std::fs::write(&config_path, "search: [unterminated").unwrap();

        assert!(Settings::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[
            ("SEARCH_PROVIDER", "bing"),
            ("SEARCH_API_KEY", "secret"),
            ("SEARCH_ENDPOINT", "https://search.example/v7"),
            ("CLAIMCHECK_MAX_CONCURRENCY", "8"),
            ("CLAIMCHECK_HEARTBEAT_INTERVAL_MS", "not-a-number"),
        ]));

        assert_eq!(settings.search.provider, ProviderMode::Bing);
        assert_eq!(settings.search.api_key(), Some("secret"));
        assert_eq!(settings.search.endpoint.as_deref(), Some("https://search.example/v7"));
        assert_eq!(settings.pipeline.max_concurrency, 8);
        assert_eq!(settings.pipeline.heartbeat_interval_ms, 10_000);
    }

    #[test]
    fn test_bing_key_takes_precedence() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[("BING_API_KEY", "first"), ("SEARCH_API_KEY", "second")]));
        assert_eq!(settings.search.api_key(), Some("first"));

        let mut settings = Settings::default();
        settings.apply_env(env(&[("BING_API_KEY", "  "), ("SEARCH_API_KEY", "second")]));
        assert_eq!(settings.search.api_key(), Some("second"));
    }

    #[test]
    fn test_debug_hides_key() {
        let settings = SearchSettings {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("has_api_key: true"));
    }
}
