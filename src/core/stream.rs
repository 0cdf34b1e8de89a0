//! Event numbering and NDJSON framing for streamed runs.

use crate::domain::{
    ClaimResult, ErrorPayload, EventPayload, RunSummary, Sentence, SentencePayload, StreamEvent,
    StreamFrame,
};

/// Assigns sequence numbers to the events of one stream.
///
/// Numbers start at 0 and increase by exactly one per event.
#[derive(Debug, Default)]
pub struct Sequencer {
    next_seq: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next event will get
    pub fn peek(&self) -> u64 {
        self.next_seq
    }

    /// Number a payload
    pub fn next(&mut self, payload: EventPayload, progress: Option<f64>) -> StreamEvent {
        let seq = self.next_seq;
        self.next_seq += 1;
        StreamEvent {
            payload,
            seq,
            progress,
        }
    }

    pub fn sentence(&mut self, index: usize, total: usize, sentence: Sentence) -> StreamEvent {
        self.next(
            EventPayload::Sentence(SentencePayload { index, sentence }),
            Some(fraction(index + 1, total)),
        )
    }

    /// Evidence then score event for one claim
    pub fn claim(
        &mut self,
        claim_index: usize,
        claim_total: usize,
        result: ClaimResult,
    ) -> (StreamEvent, StreamEvent) {
        let (evidence, score) = result.into_payloads();
        let evidence = self.next(EventPayload::Evidence(evidence), None);
        let score = self.next(
            EventPayload::Score(score),
            Some(fraction(claim_index + 1, claim_total)),
        );
        (evidence, score)
    }

    pub fn done(&mut self, summary: RunSummary) -> StreamEvent {
        self.next(EventPayload::Done(summary), Some(1.0))
    }
}

/// Fatal pipeline error event; always numbered 0
pub fn error_event(message: impl Into<String>) -> StreamEvent {
    StreamEvent {
        payload: EventPayload::Error(ErrorPayload {
            message: message.into(),
        }),
        seq: 0,
        progress: None,
    }
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Encode a frame as one NDJSON line (with trailing newline).
///
/// Heartbeats are the empty object `{}`.
pub fn ndjson_line(frame: &StreamFrame) -> serde_json::Result<String> {
    let mut line = match frame {
        StreamFrame::Event(event) => serde_json::to_string(event)?,
        StreamFrame::Heartbeat => "{}".to_string(),
    };
    line.push('\n');
    Ok(line)
}
