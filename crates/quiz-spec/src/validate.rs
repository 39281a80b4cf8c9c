use std::collections::BTreeSet;

use crate::answers::{AnswerSet, ValidationError, ValidationResult};
use crate::spec::{QuestionSpec, QuizSpec};

/// Checks a complete answer document against the quiz: every question
/// answered with one of its option values and no unknown keys.
pub fn validate(spec: &QuizSpec, answers: &AnswerSet) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for question in &spec.questions {
        match answers.get(&question.id) {
            None => missing_required.push(question.id.clone()),
            Some(value) => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
        }
    }

    let known: BTreeSet<&str> = spec
        .questions
        .iter()
        .map(|question| question.id.as_str())
        .collect();
    let unknown_fields: Vec<String> = answers
        .answers
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

/// Validates a single answer for `question`.
pub fn validate_value(question: &QuestionSpec, value: &str) -> Option<ValidationError> {
    if question.accepts(value) {
        return None;
    }
    Some(ValidationError {
        question_id: Some(question.id.clone()),
        path: Some(format!("/{}", question.id)),
        message: format!(
            "expected one of: {}",
            question.option_values().join(", ")
        ),
        code: Some("invalid_option".into()),
    })
}
