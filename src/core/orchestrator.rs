//! Main orchestrator for claim checking.
//!
//! Coordinates segmentation, claim detection, evidence retrieval and
//! ranking, either as a single aggregate result or as an event stream.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, Stream};
use futures::{FutureExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{select_provider, EvidenceProvider};
use crate::config::{PipelineSettings, Settings};
use crate::domain::{
    ClaimResult, InferenceRequest, InferenceResult, RunMetadata, Sentence, StreamFrame,
};
use crate::text::{ClaimDetector, SegmentError, Segmenter, UnicodeSegmenter};

use super::query::formulate_query;
use super::ranker;
use super::stream::{error_event, Sequencer};

/// Pipeline-level failures; these abort the whole request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmentError),
}

/// Main claim-checking orchestrator
pub struct Orchestrator {
    segmenter: Arc<dyn Segmenter>,
    detector: ClaimDetector,
    provider: Arc<dyn EvidenceProvider>,
    settings: PipelineSettings,
}

impl Orchestrator {
    /// Create an orchestrator with the default segmenter and the
    /// configured evidence provider
    pub fn new(settings: &Settings) -> Self {
        Self::with_components(
            Arc::new(UnicodeSegmenter::new(settings.pipeline.max_input_bytes)),
            select_provider(&settings.search),
            settings.pipeline.clone(),
        )
    }

    /// Create an orchestrator from explicit components
    pub fn with_components(
        segmenter: Arc<dyn Segmenter>,
        provider: Arc<dyn EvidenceProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            segmenter,
            detector: ClaimDetector::default(),
            provider,
            settings,
        }
    }

    pub fn provider(&self) -> &Arc<dyn EvidenceProvider> {
        &self.provider
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Split text into sentences and flag the claims
    pub fn analyze(&self, text: &str) -> Result<Vec<Sentence>, PipelineError> {
        let spans = self.segmenter.segment(text)?;
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        let flags = self.detector.detect_all(&texts);

        Ok(spans
            .into_iter()
            .zip(flags)
            .map(|(span, is_claim)| {
                Sentence::new(span.text, is_claim).with_offsets(span.start_char, span.end_char)
            })
            .collect())
    }

    /// Retrieve and rank evidence for one claim
    #[instrument(skip(self, claim), fields(provider = self.provider.name()))]
    pub async fn check_claim(
        &self,
        claim: &str,
        sentence_index: usize,
        top_k: usize,
    ) -> ClaimResult {
        let started = Instant::now();
        let query = formulate_query(claim);
        let evidence = self.provider.search(&query, top_k).await;
        let ranking = ranker::rank(claim, &evidence, top_k, top_k);

        debug!(
            retrieved = evidence.len(),
            supporting = ranking.supporting.len(),
            refuting = ranking.refuting.len(),
            label = %ranking.label,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Claim checked"
        );

        ClaimResult {
            claim: claim.to_string(),
            sentence_index,
            supporting_evidence: ranking.supporting,
            refuting_evidence: ranking.refuting,
            score: ranking.score,
            label: ranking.label,
        }
    }

    /// Like `check_claim`, but a panic yields an inconclusive result
    async fn check_claim_isolated(
        &self,
        claim: String,
        sentence_index: usize,
        top_k: usize,
    ) -> ClaimResult {
        match AssertUnwindSafe(self.check_claim(&claim, sentence_index, top_k))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(sentence_index, "Claim check panicked, marking as NEI");
                ClaimResult::inconclusive(claim, sentence_index)
            }
        }
    }

    /// Check claims concurrently, yielding results in sentence order
    fn claim_results(
        &self,
        claims: Vec<(usize, String)>,
        top_k: usize,
    ) -> impl Stream<Item = ClaimResult> + Send + '_ {
        stream::iter(claims)
            .map(move |(index, claim)| self.check_claim_isolated(claim, index, top_k))
            .buffered(self.settings.max_concurrency.max(1))
    }

    /// Run a request to completion and return the aggregate result
    #[instrument(skip(self, request), fields(top_k = request.effective_top_k()))]
    pub async fn run(&self, request: &InferenceRequest) -> InferenceResult {
        let started = Instant::now();
        let mut metadata = RunMetadata::start(request, self.provider.name());
        info!(run_id = %metadata.run_id, "Starting claim check");

        let sentences = match self.analyze(&request.text) {
            Ok(sentences) => sentences,
            Err(e) => {
                error!(run_id = %metadata.run_id, error = %e, "Claim check failed");
                metadata.elapsed_ms = elapsed_ms(started);
                return InferenceResult::failed(e.to_string(), metadata);
            }
        };

        let claims: Vec<ClaimResult> = self
            .claim_results(claim_inputs(&sentences), request.effective_top_k())
            .collect()
            .await;

        metadata.elapsed_ms = elapsed_ms(started);
        let result = InferenceResult::completed(sentences, claims, metadata);
        log_finished(&result);
        result
    }

    /// Run a request as an event stream.
    ///
    /// Frames are produced by a background task onto a bounded channel.
    /// Dropping the receiver cancels the run.
    pub fn stream(self: &Arc<Self>, request: InferenceRequest) -> mpsc::Receiver<StreamFrame> {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let this = Arc::clone(self);
        tokio::spawn(async move { this.produce(request, tx).await });
        rx
    }

    #[instrument(skip(self, request, tx), fields(top_k = request.effective_top_k()))]
    async fn produce(&self, request: InferenceRequest, tx: mpsc::Sender<StreamFrame>) {
        let started = Instant::now();
        let mut metadata = RunMetadata::start(&request, self.provider.name());
        info!(run_id = %metadata.run_id, "Starting streamed claim check");

        let sentences = match self.analyze(&request.text) {
            Ok(sentences) => sentences,
            Err(e) => {
                error!(run_id = %metadata.run_id, error = %e, "Streamed claim check failed");
                let _ = tx.send(StreamFrame::Event(error_event(e.to_string()))).await;
                return;
            }
        };

        let mut seq = Sequencer::new();
        let total = sentences.len();
        for (index, sentence) in sentences.iter().enumerate() {
            let event = seq.sentence(index, total, sentence.clone());
            if tx.send(StreamFrame::Event(event)).await.is_err() {
                info!("Stream consumer disconnected");
                return;
            }
        }

        let inputs = claim_inputs(&sentences);
        let claim_total = inputs.len();
        let mut results = Box::pin(self.claim_results(inputs, request.effective_top_k()));
        let interval = self.settings.heartbeat_interval();
        let mut claims: Vec<ClaimResult> = Vec::with_capacity(claim_total);

        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    info!(completed = claims.len(), "Stream consumer disconnected");
                    return;
                }
                next = timeout(interval, results.next()) => next,
            };

            match next {
                Err(_) => {
                    debug!("Sending heartbeat");
                    if tx.send(StreamFrame::Heartbeat).await.is_err() {
                        info!(completed = claims.len(), "Stream consumer disconnected");
                        return;
                    }
                }
                Ok(None) => break,
                Ok(Some(result)) => {
                    let (evidence, score) = seq.claim(claims.len(), claim_total, result.clone());
                    claims.push(result);
                    for event in [evidence, score] {
                        if tx.send(StreamFrame::Event(event)).await.is_err() {
                            info!(completed = claims.len(), "Stream consumer disconnected");
                            return;
                        }
                    }
                }
            }
        }

        metadata.elapsed_ms = elapsed_ms(started);
        let result = InferenceResult::completed(sentences, claims, metadata);
        log_finished(&result);
        let _ = tx.send(StreamFrame::Event(seq.done(result.summary()))).await;
    }
}

/// `(sentence_index, text)` of every claim sentence, in order
fn claim_inputs(sentences: &[Sentence]) -> Vec<(usize, String)> {
    sentences
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_claim)
        .map(|(index, s)| (index, s.text.clone()))
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn log_finished(result: &InferenceResult) {
    let summary = result.summary();
    info!(
        run_id = %result.metadata.run_id,
        sentences = summary.sentence_count,
        claims = summary.claim_count,
        supported = summary.supported,
        refuted = summary.refuted,
        nei = summary.nei,
        elapsed_ms = result.metadata.elapsed_ms,
        "Claim check completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProviderError;
    use crate::domain::{EvidenceItem, InferenceStatus, Label};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every `(query, limit)` and returns fixed items
    struct Recording {
        items: Vec<EvidenceItem>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl EvidenceProvider for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn try_search(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<EvidenceItem>, ProviderError> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            Ok(self.items.clone())
        }
    }

    fn orchestrator(items: Vec<EvidenceItem>) -> (Orchestrator, Arc<Recording>) {
        let provider = Arc::new(Recording {
            items,
            calls: Mutex::new(Vec::new()),
        });
        let orchestrator = Orchestrator::with_components(
            Arc::new(UnicodeSegmenter::default()),
            provider.clone(),
            PipelineSettings::default(),
        );
        (orchestrator, provider)
    }

    #[test]
    fn test_analyze_flags_claims() {
        let (orchestrator, _) = orchestrator(Vec::new());
        let sentences = orchestrator
            .analyze("Paris is the capital of France. What time is it?")
            .unwrap();

        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].is_claim);
        assert!(!sentences[1].is_claim);
        assert_eq!(sentences[0].start_char, Some(0));
    }

    #[tokio::test]
    async fn test_query_is_formulated_from_claim() {
        let (orchestrator, provider) = orchestrator(Vec::new());
        let request = InferenceRequest::new("\"Paris is the capital of France.\"").with_top_k(3);

        let result = orchestrator.run(&request).await;

        assert_eq!(result.status, InferenceStatus::Completed);
        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("Paris is the capital of France".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_supported_claim() {
        let items = vec![
            EvidenceItem::new("Paris capital France", "https://a")
                .with_snippet("Paris is the capital and largest city of France"),
            EvidenceItem::new("France capital city Paris", "https://b")
                .with_snippet("The capital of France is Paris"),
        ];
        let (orchestrator, _) = orchestrator(items);

        let claim = orchestrator
            .check_claim("Paris is the capital of France.", 0, 5)
            .await;

        assert_eq!(claim.label, Label::Supported);
        assert_eq!(claim.supporting_evidence.len(), 2);
        assert!(claim.refuting_evidence.is_empty());
        assert!(claim.score > 0.0);
    }
}
