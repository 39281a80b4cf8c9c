use std::fmt;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const SESSION_PREFIX: &str = "sess_";
const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Correlates every event emitted by one quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates `sess_` followed by nine random base-36 characters.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SESSION_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{SESSION_PREFIX}{suffix}"))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Funnel events observed over a session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    QuizStarted {
        total_steps: usize,
    },
    QuestionAnswered {
        /// 1-based position of the answered question.
        step: usize,
        question_id: String,
        answer: String,
    },
    QuizCompleted {
        score: u32,
        qualification_level: String,
        factors: Vec<String>,
    },
    LeadSubmitted {
        qualification_level: Option<String>,
        has_phone: bool,
        has_email: bool,
    },
    ExitIntent {
        current_step: usize,
        last_question_id: Option<String>,
        answered_questions: usize,
    },
}

impl QuizEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QuizEvent::QuizStarted { .. } => "quiz_started",
            QuizEvent::QuestionAnswered { .. } => "question_answered",
            QuizEvent::QuizCompleted { .. } => "quiz_completed",
            QuizEvent::LeadSubmitted { .. } => "lead_submitted",
            QuizEvent::ExitIntent { .. } => "exit_intent",
        }
    }

    pub fn data(&self) -> Value {
        match self {
            QuizEvent::QuizStarted { total_steps } => json!({ "total_steps": total_steps }),
            QuizEvent::QuestionAnswered {
                step,
                question_id,
                answer,
            } => json!({
                "step": step,
                "question_id": question_id,
                "answer": answer,
            }),
            QuizEvent::QuizCompleted {
                score,
                qualification_level,
                factors,
            } => json!({
                "score": score,
                "qualification_level": qualification_level,
                "factors": factors,
            }),
            QuizEvent::LeadSubmitted {
                qualification_level,
                has_phone,
                has_email,
            } => json!({
                "qualification_level": qualification_level,
                "has_phone": has_phone,
                "has_email": has_email,
            }),
            QuizEvent::ExitIntent {
                current_step,
                last_question_id,
                answered_questions,
            } => json!({
                "current_step": current_step,
                "last_question_id": last_question_id,
                "answered_questions": answered_questions,
            }),
        }
    }
}

/// Envelope handed to sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: String,
    pub data: Value,
    pub timestamp: String,
    pub session_id: SessionId,
}

impl EventRecord {
    pub fn new(session_id: &SessionId, event: &QuizEvent) -> Self {
        Self {
            event: event.name().to_string(),
            data: event.data(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            session_id: session_id.clone(),
        }
    }
}

/// Receives funnel events. Sinks must not fail the session.
pub trait EventSink {
    fn record(&mut self, record: EventRecord);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, record: EventRecord) {
        (**self).record(record);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn record(&mut self, record: EventRecord) {
        (**self).record(record);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _record: EventRecord) {}
}

/// Keeps events in memory for later inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<EventRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn names(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.event.as_str())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, record: EventRecord) {
        self.records.push(record);
    }
}

/// Writes each event through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, record: EventRecord) {
        log::info!(
            "funnel event {} session={} data={}",
            record.event,
            record.session_id,
            record.data
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_session_ids_are_prefixed_base36() {
        let id = SessionId::generate();
        let suffix = id.as_str().strip_prefix("sess_").expect("prefix");
        assert_eq!(suffix.len(), 9);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn record_carries_name_payload_and_session() {
        let session = SessionId::new("sess_test");
        let record = EventRecord::new(
            &session,
            &QuizEvent::QuestionAnswered {
                step: 2,
                question_id: "duration".into(),
                answer: "yes".into(),
            },
        );
        assert_eq!(record.event, "question_answered");
        assert_eq!(record.data["step"], 2);
        assert_eq!(record.data["question_id"], "duration");
        assert_eq!(record.session_id.as_str(), "sess_test");
        assert!(record.timestamp.ends_with('Z'));
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let session = SessionId::new("sess_order");
        let mut sink = MemorySink::new();
        sink.record(EventRecord::new(
            &session,
            &QuizEvent::QuizStarted { total_steps: 5 },
        ));
        sink.record(EventRecord::new(
            &session,
            &QuizEvent::ExitIntent {
                current_step: 1,
                last_question_id: Some("condition".into()),
                answered_questions: 0,
            },
        ));
        assert_eq!(sink.names(), vec!["quiz_started", "exit_intent"]);
    }
}
