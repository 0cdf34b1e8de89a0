//! Stream events for incremental inference output.
//!
//! A stream is an ordered, one-way sequence of events. Every real event
//! carries a sequence number that strictly increases within the stream;
//! keep-alive frames carry nothing and take no sequence number.

use serde::{Deserialize, Serialize};

use super::claim::{ClaimResult, Label};
use super::evidence::EvidenceItem;
use super::run::RunSummary;
use super::sentence::Sentence;

/// A single numbered event in a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event type and its payload (`event` + `data` on the wire)
    #[serde(flatten)]
    pub payload: EventPayload,

    /// Position of this event within the stream
    pub seq: u64,

    /// Optional normalized progress in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl StreamEvent {
    pub fn kind(&self) -> EventType {
        self.payload.kind()
    }
}

/// Payload of a stream event, tagged by event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// A sentence and its claim flag
    Sentence(SentencePayload),

    /// Ranked evidence for one claim
    Evidence(EvidencePayload),

    /// Aggregate score and label for one claim
    Score(ScorePayload),

    /// The run finished
    Done(RunSummary),

    /// The run failed at pipeline level
    Error(ErrorPayload),
}

impl EventPayload {
    pub fn kind(&self) -> EventType {
        match self {
            EventPayload::Sentence(_) => EventType::Sentence,
            EventPayload::Evidence(_) => EventType::Evidence,
            EventPayload::Score(_) => EventType::Score,
            EventPayload::Done(_) => EventType::Done,
            EventPayload::Error(_) => EventType::Error,
        }
    }
}

/// Types of stream events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Sentence,
    Evidence,
    Score,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentencePayload {
    /// Position of the sentence in the input
    pub index: usize,

    #[serde(flatten)]
    pub sentence: Sentence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePayload {
    pub claim: String,
    pub sentence_index: usize,
    pub supporting_evidence: Vec<EvidenceItem>,
    pub refuting_evidence: Vec<EvidenceItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePayload {
    pub claim: String,
    pub sentence_index: usize,
    pub score: f64,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

impl ClaimResult {
    /// Split into the evidence and score halves emitted on a stream
    pub fn into_payloads(self) -> (EvidencePayload, ScorePayload) {
        let score = ScorePayload {
            claim: self.claim.clone(),
            sentence_index: self.sentence_index,
            score: self.score,
            label: self.label,
        };
        let evidence = EvidencePayload {
            claim: self.claim,
            sentence_index: self.sentence_index,
            supporting_evidence: self.supporting_evidence,
            refuting_evidence: self.refuting_evidence,
        };
        (evidence, score)
    }
}

/// What travels over the stream channel
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// A numbered event
    Event(StreamEvent),

    /// Keep-alive during long gaps (no sequence number)
    Heartbeat,
}

impl StreamFrame {
    /// The event, if this is not a heartbeat
    pub fn event(&self) -> Option<&StreamEvent> {
        match self {
            StreamFrame::Event(event) => Some(event),
            StreamFrame::Heartbeat => None,
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        matches!(self, StreamFrame::Heartbeat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = StreamEvent {
            payload: EventPayload::Sentence(SentencePayload {
                index: 0,
                sentence: Sentence::new("Paris is the capital of France.", true),
            }),
            seq: 0,
            progress: Some(0.5),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "sentence");
        assert_eq!(json["seq"], 0);
        assert_eq!(json["progress"], 0.5);
        assert_eq!(json["data"]["index"], 0);
        assert_eq!(json["data"]["is_claim"], true);
    }

    #[test]
    fn test_event_parse_back() {
        let line = r#"{"event":"error","data":{"message":"boom"},"seq":0}"#;
        let event: StreamEvent = serde_json::from_str(line).unwrap();

        assert_eq!(event.kind(), EventType::Error);
        assert_eq!(event.progress, None);
    }

    #[test]
    fn test_claim_result_split() {
        let mut result = ClaimResult::inconclusive("Water is wet.", 2);
        result.supporting_evidence.push(EvidenceItem::new("Water", "https://w"));
        result.score = 1.5;
        result.label = Label::Supported;

        let (evidence, score) = result.into_payloads();
        assert_eq!(evidence.sentence_index, 2);
        assert_eq!(evidence.supporting_evidence.len(), 1);
        assert_eq!(score.label, Label::Supported);
        assert_eq!(score.score, 1.5);
    }
}
