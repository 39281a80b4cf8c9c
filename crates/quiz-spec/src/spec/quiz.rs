use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::question::QuestionSpec;

const BUILTIN_QUIZ: &str = include_str!("../../fixtures/ssd_quiz.json");

/// Presentation hints for a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizPresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

/// Errors raised while loading a quiz definition.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse quiz spec: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("quiz '{0}' defines no questions")]
    NoQuestions(String),
    #[error("question id '{0}' is used more than once")]
    DuplicateQuestion(String),
    #[error("question '{0}' defines no options")]
    NoOptions(String),
    #[error("question '{question}' repeats option value '{value}'")]
    DuplicateOption { question: String, value: String },
}

/// Top-level quiz definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<QuizPresentation>,
    pub questions: Vec<QuestionSpec>,
}

impl QuizSpec {
    /// The SSD qualification quiz shipped with the crate.
    pub fn builtin() -> Result<Self, SpecError> {
        Self::from_json(BUILTIN_QUIZ)
    }

    /// Raw JSON of the built-in quiz.
    pub fn builtin_json() -> &'static str {
        BUILTIN_QUIZ
    }

    /// Parses and checks a quiz definition.
    pub fn from_json(raw: &str) -> Result<Self, SpecError> {
        let spec: QuizSpec = serde_json::from_str(raw)?;
        spec.check()?;
        Ok(spec)
    }

    /// Structural checks: at least one question, unique ids, and a
    /// non-empty, duplicate-free option list per question.
    pub fn check(&self) -> Result<(), SpecError> {
        if self.questions.is_empty() {
            return Err(SpecError::NoQuestions(self.id.clone()));
        }

        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(SpecError::DuplicateQuestion(question.id.clone()));
            }
            if question.options.is_empty() {
                return Err(SpecError::NoOptions(question.id.clone()));
            }
            let mut values = BTreeSet::new();
            for option in &question.options {
                if !values.insert(option.value.as_str()) {
                    return Err(SpecError::DuplicateOption {
                        question: question.id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn help(&self) -> Option<String> {
        self.presentation
            .as_ref()
            .and_then(|presentation| presentation.intro.clone())
            .or_else(|| self.description.clone())
    }
}
