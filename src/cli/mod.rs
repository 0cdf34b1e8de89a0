//! Command-line interface for claimcheck.
//!
//! Provides commands for checking claims in text, inspecting claim
//! detection, querying the evidence provider, and showing configuration.

use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::select_provider;
use crate::config::Settings;
use crate::core::{ndjson_line, Orchestrator};
use crate::domain::{
    EventPayload, InferenceRequest, InferenceStatus, StreamFrame, DEFAULT_TOP_K, MAX_TOP_K,
    MIN_TOP_K,
};
use crate::text::{ClaimDetector, Segmenter, UnicodeSegmenter};

/// claimcheck - Claim detection and evidence-based fact checking
#[derive(Parser, Debug)]
#[command(name = "claimcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to .claimcheck/config.yaml in this or a parent directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the claims in a text against web evidence
    Check {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Evidence items kept per claim and direction (clamped to 1..=50)
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Language hint for the input text
        #[arg(short, long)]
        language: Option<String>,

        /// Emit NDJSON events instead of one aggregate result
        #[arg(long)]
        stream: bool,

        /// Caller metadata echoed in the result (JSON object)
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Show sentences and their claim flags (no network)
    Detect {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Query the configured evidence provider directly
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load_from(self.config.as_deref())?;
        settings.log_snapshot();

        match self.command {
            Commands::Check {
                input,
                top_k,
                language,
                stream,
                metadata,
            } => {
                let mut request = InferenceRequest::new(read_input(input)?)
                    .with_top_k(top_k)
                    .with_streaming(stream);
                if let Some(language) = language {
                    request = request.with_language(language);
                }
                if let Some(raw) = metadata {
                    request = request.with_metadata(parse_metadata(&raw)?);
                }
                check(&settings, request).await
            }
            Commands::Detect { input } => detect(&settings, &read_input(input)?),
            Commands::Search { query, limit } => search(&settings, &query, limit).await,
            Commands::Config => show_config(&settings),
        }
    }
}

/// Read text from a file, or from stdin when it is piped
fn read_input(input_file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = input_file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }

    if io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn parse_metadata(raw: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
    serde_json::from_str(raw).context("--metadata must be a JSON object")
}

/// Run a check and print the aggregate result or the event stream
async fn check(settings: &Settings, request: InferenceRequest) -> Result<()> {
    let orchestrator = Arc::new(Orchestrator::new(settings));

    if !request.streaming {
        let result = orchestrator.run(&request).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to encode result")?
        );
        if result.status == InferenceStatus::Error {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut frames = orchestrator.stream(request);
    let stdout = io::stdout();
    let mut failed = false;

    while let Some(frame) = frames.recv().await {
        if let StreamFrame::Event(event) = &frame {
            failed |= matches!(event.payload, EventPayload::Error(_));
        }
        let line = ndjson_line(&frame).context("Failed to encode event")?;
        let mut out = stdout.lock();
        out.write_all(line.as_bytes())
            .and_then(|_| out.flush())
            .context("Failed to write event")?;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Print each sentence with its claim flag
fn detect(settings: &Settings, text: &str) -> Result<()> {
    let segmenter = UnicodeSegmenter::new(settings.pipeline.max_input_bytes);
    let detector = ClaimDetector::default();
    let spans = segmenter.segment(text).context("Failed to segment input")?;

    if spans.is_empty() {
        println!("No sentences found");
        return Ok(());
    }

    println!("{:<5} {:<7} {}", "#", "CLAIM", "SENTENCE");
    println!("{}", "-".repeat(75));
    for (index, span) in spans.iter().enumerate() {
        let flag = if detector.detect(&span.text) { "yes" } else { "no" };
        println!("{:<5} {:<7} {}", index, flag, span.text);
    }

    Ok(())
}

/// Run the selected provider and print normalized items
async fn search(settings: &Settings, query: &str, limit: usize) -> Result<()> {
    let provider = select_provider(&settings.search);
    let items = provider
        .search(query, limit.clamp(MIN_TOP_K, MAX_TOP_K))
        .await;

    eprintln!("{} result(s) from {}", items.len(), provider.name());
    println!(
        "{}",
        serde_json::to_string_pretty(&items).context("Failed to encode results")?
    );
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(settings: &Settings) -> Result<()> {
    let search = &settings.search;
    let pipeline = &settings.pipeline;

    println!(
        "Config file: {}",
        settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Search:");
    println!("  Provider mode:      {}", search.provider);
    println!("  API key:            {}", if search.api_key().is_some() { "set" } else { "not set" });
    println!("  Endpoint:           {}", search.endpoint.as_deref().unwrap_or("(default)"));
    println!("  Timeout:            {}s", search.timeout_seconds);
    println!("  Wikipedia language: {}", search.wikipedia_language);
    println!();
    println!("Pipeline:");
    println!("  Max concurrency:    {}", pipeline.max_concurrency);
    println!("  Heartbeat interval: {}ms", pipeline.heartbeat_interval_ms);
    println!("  Channel capacity:   {}", pipeline.channel_capacity);
    println!("  Max input size:     {} bytes", pipeline.max_input_bytes);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::parse_from([
            "claimcheck",
            "check",
            "--top-k",
            "0",
            "--stream",
            "--metadata",
            r#"{"source":"test"}"#,
        ]);

        match cli.command {
            Commands::Check {
                top_k,
                stream,
                metadata,
                input,
                ..
            } => {
                assert_eq!(top_k, 0);
                assert!(stream);
                assert!(input.is_none());
                assert_eq!(parse_metadata(&metadata.unwrap()).unwrap()["source"], "test");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["claimcheck", "search", "earth", "--config", "/tmp/c.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(matches!(cli.command, Commands::Search { limit: 5, .. }));
    }

    #[test]
    fn test_metadata_must_be_object() {
        assert!(parse_metadata("[1, 2]").is_err());
        assert!(parse_metadata("not json").is_err());
    }

    #[test]
    fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "Paris is the capital of France.").unwrap();

        assert_eq!(read_input(Some(path)).unwrap(), "Paris is the capital of France.");
        assert!(read_input(Some(dir.path().join("missing.txt"))).is_err());
    }
}
