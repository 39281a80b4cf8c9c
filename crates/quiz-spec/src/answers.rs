use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Answers collected for a quiz, keyed by question id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSet {
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub spec_version: String,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

impl AnswerSet {
    pub fn new(quiz_id: impl Into<String>, spec_version: impl Into<String>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            spec_version: spec_version.into(),
            answers: BTreeMap::new(),
        }
    }

    /// Builds an anonymous answer set from `(question_id, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            answers: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    /// Returns a copy with one more answer recorded.
    pub fn with_answer(&self, question_id: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.answers
            .insert(question_id.to_string(), value.to_string());
        next
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Single validation failure attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Aggregated outcome of validating an answer document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub unknown_fields: Vec<String>,
}
