use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use quiz_spec::{
    AnswerSet, LeadForm, LeadSubmission, QuizSpec, RenderPayload, SessionError, SessionId,
    SpecError, ValidationError, ValidationResult, answers_schema, build_render_payload, render_card as quiz_render_card,
    render_json_ui as quiz_render_json_ui, render_text as quiz_render_text, score, validate,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse {0}")]
    Parse(&'static str, #[source] serde_json::Error),
    #[error("invalid quiz spec: {0}")]
    Spec(#[from] SpecError),
    #[error("quiz '{0}' is not available")]
    QuizUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("{0}")]
    Session(#[from] SessionError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    quiz_spec_json: Option<String>,
}

fn load_quiz_spec(config_json: &str) -> Result<QuizSpec, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(|err| ComponentError::Parse("config", err))?
    };

    let spec_json = config
        .quiz_spec_json
        .as_deref()
        .unwrap_or(QuizSpec::builtin_json());
    Ok(QuizSpec::from_json(spec_json)?)
}

fn ensure_quiz(quiz_id: &str, config_json: &str) -> Result<QuizSpec, ComponentError> {
    let spec = load_quiz_spec(config_json)?;
    if spec.id != quiz_id {
        Err(ComponentError::QuizUnavailable(quiz_id.to_string()))
    } else {
        Ok(spec)
    }
}

/// Answer documents are plain `{question_id: value}` maps; anything else
/// is treated as empty.
fn raw_answers(answers_json: &str) -> Map<String, Value> {
    serde_json::from_str(answers_json).unwrap_or_default()
}

/// Keeps the string-valued entries of `raw`.
fn answers_from_map(spec: &QuizSpec, raw: &Map<String, Value>) -> AnswerSet {
    let answers = raw
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|text| (key.clone(), text.to_string())))
        .collect();
    AnswerSet {
        quiz_id: spec.id.clone(),
        spec_version: spec.version.clone(),
        answers,
    }
}

fn parse_answers(spec: &QuizSpec, answers_json: &str) -> AnswerSet {
    answers_from_map(spec, &raw_answers(answers_json))
}

/// Validates a raw document. Non-string values are reported as
/// `type_mismatch` only, never also as missing.
fn check_answers(spec: &QuizSpec, raw: &Map<String, Value>) -> ValidationResult {
    let mut validation = validate(spec, &answers_from_map(spec, raw));
    validation
        .missing_required
        .retain(|question_id| !raw.contains_key(question_id));
    validation.errors.extend(
        raw.iter()
            .filter(|(_, value)| !value.is_string())
            .map(|(key, _)| ValidationError {
                question_id: Some(key.clone()),
                path: Some(format!("/{}", key)),
                message: "type mismatch".into(),
                code: Some("type_mismatch".into()),
            }),
    );
    validation.valid = validation.errors.is_empty()
        && validation.missing_required.is_empty()
        && validation.unknown_fields.is_empty();
    validation
}

fn answers_value(answers: &AnswerSet) -> Value {
    Value::Object(
        answers
            .answers
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            log::debug!("component call failed: {}", err);
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

pub fn describe(quiz_id: &str, config_json: &str) -> String {
    respond(
        ensure_quiz(quiz_id, config_json)
            .and_then(|spec| serde_json::to_value(spec).map_err(ComponentError::JsonEncode)),
    )
}

pub fn get_answer_schema(quiz_id: &str, config_json: &str) -> String {
    respond(ensure_quiz(quiz_id, config_json).map(|spec| answers_schema(&spec)))
}

pub fn validate_answers(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_quiz(quiz_id, config_json).and_then(|spec| {
        let raw: Map<String, Value> = serde_json::from_str(answers_json)
            .map_err(|err| ComponentError::Parse("answers", err))?;
        serde_json::to_value(check_answers(&spec, &raw)).map_err(ComponentError::JsonEncode)
    }))
}

/// Scores an answer document without checking it against a quiz.
pub fn score_answers(answers_json: &str) -> String {
    respond(
        serde_json::from_str::<Map<String, Value>>(answers_json)
            .map_err(|err| ComponentError::Parse("answers", err))
            .and_then(|raw| {
                let answers = AnswerSet::from_pairs(raw.into_iter().filter_map(|(key, value)| {
                    value.as_str().map(|text| (key, text.to_string()))
                }));
                serde_json::to_value(score(&answers)).map_err(ComponentError::JsonEncode)
            }),
    )
}

fn progress_value(payload: &RenderPayload) -> Value {
    json!({
        "answered": payload.progress.answered,
        "total": payload.progress.total,
        "percent": payload.percent,
    })
}

fn status_response(payload: &RenderPayload, answers: &AnswerSet) -> Value {
    json!({
        "status": payload.status.as_str(),
        "next_question_id": payload.next_question_id,
        "progress": progress_value(payload),
        "answers": answers_value(answers),
        "result": payload.result,
    })
}

fn build_error_response(
    payload: &RenderPayload,
    answers: &AnswerSet,
    validation: &ValidationResult,
) -> Result<Value, ComponentError> {
    let validation_value = serde_json::to_value(validation).map_err(ComponentError::JsonEncode)?;
    Ok(json!({
        "status": "error",
        "next_question_id": payload.next_question_id,
        "progress": progress_value(payload),
        "answers": answers_value(answers),
        "validation": validation_value,
    }))
}

pub fn next(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_quiz(quiz_id, config_json).map(|spec| {
        let answers = parse_answers(&spec, answers_json);
        let payload = build_render_payload(&spec, &answers);
        status_response(&payload, &answers)
    }))
}

/// Answers the next open question. Earlier answers must be valid option
/// values of known questions, and the answer must target the question the
/// quiz is waiting on with one of its option values.
pub fn submit_answer(
    quiz_id: &str,
    config_json: &str,
    answers_json: &str,
    question_id: &str,
    value: &str,
) -> String {
    respond(ensure_quiz(quiz_id, config_json).and_then(|spec| {
        let raw = raw_answers(answers_json);
        let answers = answers_from_map(&spec, &raw);
        let payload = build_render_payload(&spec, &answers);

        let mut prior = check_answers(&spec, &raw);
        prior.missing_required.clear();
        prior.valid = prior.errors.is_empty() && prior.unknown_fields.is_empty();
        if !prior.valid {
            return build_error_response(&payload, &answers, &prior);
        }

        let step = payload
            .next_question_id
            .as_deref()
            .and_then(|next| spec.questions.iter().position(|q| q.id == next));
        let outcome = match step {
            Some(step) => quiz_spec::advance(&spec, step, &answers, question_id, value),
            None => Err(SessionError::AlreadyComplete),
        };

        match outcome {
            Ok((answers, _)) => {
                let payload = build_render_payload(&spec, &answers);
                Ok(status_response(&payload, &answers))
            }
            Err(err) => {
                let validation = ValidationResult {
                    valid: false,
                    errors: vec![ValidationError {
                        question_id: Some(question_id.to_string()),
                        path: Some(format!("/{}", question_id)),
                        message: err.to_string(),
                        code: Some(err.code().into()),
                    }],
                    missing_required: Vec::new(),
                    unknown_fields: Vec::new(),
                };
                build_error_response(&payload, &answers, &validation)
            }
        }
    }))
}

pub fn submit_all(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_quiz(quiz_id, config_json).and_then(|spec| {
        let raw = raw_answers(answers_json);
        let answers = answers_from_map(&spec, &raw);
        let validation = check_answers(&spec, &raw);
        let payload = build_render_payload(&spec, &answers);

        if !validation.valid {
            return build_error_response(&payload, &answers, &validation);
        }
        Ok(status_response(&payload, &answers))
    }))
}

/// Builds the lead webhook payload for a completed answer document. A blank
/// `session_id` gets a freshly generated one.
pub fn submit_lead(
    quiz_id: &str,
    config_json: &str,
    session_id: &str,
    answers_json: &str,
    lead_json: &str,
) -> String {
    respond(ensure_quiz(quiz_id, config_json).and_then(|spec| {
        let raw = raw_answers(answers_json);
        let answers = answers_from_map(&spec, &raw);
        let validation = check_answers(&spec, &raw);
        if !validation.valid {
            if validation.errors.is_empty() && validation.unknown_fields.is_empty() {
                return Err(SessionError::NotComplete.into());
            }
            let payload = build_render_payload(&spec, &answers);
            return build_error_response(&payload, &answers, &validation);
        }

        let lead: LeadForm =
            serde_json::from_str(lead_json).map_err(|err| ComponentError::Parse("lead", err))?;
        let missing = lead.missing_required();
        if !missing.is_empty() {
            return Err(SessionError::MissingLeadFields(missing).into());
        }

        let session_id = if session_id.trim().is_empty() {
            SessionId::generate()
        } else {
            SessionId::new(session_id.trim())
        };
        log::debug!("lead submitted for session {}", session_id);
        let submission = LeadSubmission {
            session_id,
            qualification: score(&answers),
            lead,
            answers,
        };
        let mut value = serde_json::to_value(submission).map_err(ComponentError::JsonEncode)?;
        if let Value::Object(map) = &mut value {
            map.insert("status".into(), Value::String("submitted".into()));
        }
        Ok(value)
    }))
}

fn render_payload(
    quiz_id: &str,
    config_json: &str,
    answers_json: &str,
) -> Result<RenderPayload, ComponentError> {
    let spec = ensure_quiz(quiz_id, config_json)?;
    let answers = parse_answers(&spec, answers_json);
    Ok(build_render_payload(&spec, &answers))
}

pub fn render_text(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond_string(
        render_payload(quiz_id, config_json, answers_json).map(|payload| quiz_render_text(&payload)),
    )
}

pub fn render_json_ui(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        render_payload(quiz_id, config_json, answers_json)
            .map(|payload| quiz_render_json_ui(&payload)),
    )
}

pub fn render_card(quiz_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        render_payload(quiz_id, config_json, answers_json).map(|payload| quiz_render_card(&payload)),
    )
}
