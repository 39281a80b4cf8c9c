use serde_json::{Map, Value, json};

use crate::{
    answers::AnswerSet,
    answers_schema,
    progress::{Progress, counter_label, next_question, percent},
    score::{MAX_SCORE, QualificationResult, Tier, score},
    spec::{OptionSpec, QuizSpec},
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// More answers are required.
    NeedInput,
    /// Every question is answered and a result is attached.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: String,
    pub prompt: String,
    pub subtext: Option<String>,
    pub options: Vec<OptionSpec>,
    pub current_value: Option<String>,
}

/// Collected payload used by the text, JSON and card renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub quiz_id: String,
    pub quiz_title: String,
    pub quiz_version: String,
    pub status: RenderStatus,
    pub next_question_id: Option<String>,
    pub progress: Progress,
    /// Progress bar fill for the question on screen.
    pub percent: u32,
    pub counter: String,
    pub help: Option<String>,
    pub questions: Vec<RenderQuestion>,
    pub result: Option<QualificationResult>,
    pub schema: Value,
}

impl RenderPayload {
    pub fn question(&self, id: &str) -> Option<&RenderQuestion> {
        self.questions.iter().find(|question| question.id == id)
    }
}

/// Build the renderer payload from the quiz and the answers so far.
pub fn build_render_payload(spec: &QuizSpec, answers: &AnswerSet) -> RenderPayload {
    let next = next_question(spec, answers);
    let progress = Progress::of(spec, answers);
    let step = next
        .and_then(|question| spec.questions.iter().position(|q| q.id == question.id))
        .unwrap_or_else(|| spec.last_index());

    let questions = spec
        .questions
        .iter()
        .map(|question| RenderQuestion {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            subtext: question.subtext.clone(),
            options: question.options.clone(),
            current_value: answers.get(&question.id).map(str::to_string),
        })
        .collect();

    let (status, result) = match next {
        Some(_) => (RenderStatus::NeedInput, None),
        None => (RenderStatus::Complete, Some(score(answers))),
    };

    RenderPayload {
        quiz_id: spec.id.clone(),
        quiz_title: spec.title.clone(),
        quiz_version: spec.version.clone(),
        status,
        next_question_id: next.map(|question| question.id.clone()),
        progress,
        percent: percent(step, spec.total()),
        counter: counter_label(step, spec.total()),
        help: spec.help(),
        questions,
        result,
        schema: answers_schema::generate(spec),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(question.id.clone()));
            map.insert("prompt".into(), Value::String(question.prompt.clone()));
            map.insert(
                "subtext".into(),
                question
                    .subtext
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
            map.insert(
                "options".into(),
                Value::Array(
                    question
                        .options
                        .iter()
                        .map(|option| {
                            json!({
                                "value": option.value,
                                "label": option.label,
                                "icon": option.icon,
                            })
                        })
                        .collect(),
                ),
            );
            if let Some(current_value) = &question.current_value {
                map.insert(
                    "current_value".into(),
                    Value::String(current_value.clone()),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "quiz_id": payload.quiz_id,
        "quiz_title": payload.quiz_title,
        "quiz_version": payload.quiz_version,
        "status": payload.status.as_str(),
        "next_question_id": payload.next_question_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
            "percent": payload.percent,
            "label": payload.counter,
        },
        "help": payload.help,
        "questions": questions,
        "result": payload.result,
        "schema": payload.schema,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Quiz: {} ({})", payload.quiz_title, payload.quiz_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    match (&payload.next_question_id, &payload.result) {
        (Some(next_question), _) => {
            lines.push(format!("{} ({}% complete)", payload.counter, payload.percent));
            if let Some(question) = payload.question(next_question) {
                lines.push(format!("  {}", question.prompt));
                if let Some(subtext) = &question.subtext {
                    lines.push(format!("  {}", subtext));
                }
                for (index, option) in question.options.iter().enumerate() {
                    lines.push(format!(
                        "  {}) {} {} [{}]",
                        index + 1,
                        option.icon,
                        option.label,
                        option.value
                    ));
                }
            }
        }
        (None, Some(result)) => lines.push(render_result_text(result)),
        (None, None) => lines.push("All questions are answered.".to_string()),
    }

    lines.join("\n")
}

/// Plain-text result banner: message, score and contributing factors.
pub fn render_result_text(result: &QualificationResult) -> String {
    let mut lines = vec![
        format!("Result: {} [{}]", result.message, result.tier),
        format!("Score: {}/{}", result.score, MAX_SCORE),
    ];
    if !result.factors.is_empty() {
        lines.push(format!("Factors: {}", result.factors.join(", ")));
    }
    lines.join("\n")
}

/// Render the payload as an Adaptive Card v1.3 transport.
pub fn render_card(payload: &RenderPayload) -> Value {
    let mut body = Vec::new();

    body.push(json!({
        "type": "TextBlock",
        "text": payload.quiz_title,
        "weight": "Bolder",
        "size": "Large",
        "wrap": true,
    }));

    if let Some(help) = &payload.help {
        body.push(json!({
            "type": "TextBlock",
            "text": help,
            "wrap": true,
        }));
    }

    let mut actions = Vec::new();

    if let Some(question_id) = &payload.next_question_id {
        body.push(json!({
            "type": "TextBlock",
            "text": format!("{} ({}% complete)", payload.counter, payload.percent),
            "isSubtle": true,
            "wrap": true,
        }));
        if let Some(question) = payload.question(question_id) {
            let mut items = vec![json!({
                "type": "TextBlock",
                "text": question.prompt,
                "weight": "Bolder",
                "wrap": true,
            })];
            if let Some(subtext) = &question.subtext {
                items.push(json!({
                    "type": "TextBlock",
                    "text": subtext,
                    "wrap": true,
                    "spacing": "Small",
                }));
            }
            let choices = question
                .options
                .iter()
                .map(|option| {
                    json!({
                        "title": format!("{} {}", option.icon, option.label),
                        "value": option.value,
                    })
                })
                .collect::<Vec<_>>();
            items.push(json!({
                "type": "Input.ChoiceSet",
                "id": question.id,
                "style": "expanded",
                "isRequired": true,
                "choices": choices,
            }));

            body.push(json!({
                "type": "Container",
                "items": items,
            }));

            actions.push(json!({
                "type": "Action.Submit",
                "title": "Next ➡️",
                "data": {
                    "quiz": {
                        "quizId": payload.quiz_id,
                        "mode": "answer",
                        "questionId": question.id,
                    }
                }
            }));
        }
    } else if let Some(result) = &payload.result {
        body.push(json!({
            "type": "Container",
            "style": "emphasis",
            "items": [
                {
                    "type": "TextBlock",
                    "text": result.message,
                    "weight": "Bolder",
                    "size": "ExtraLarge",
                    "color": tier_card_color(result.tier),
                    "wrap": true,
                },
                {
                    "type": "FactSet",
                    "facts": result
                        .factors
                        .iter()
                        .map(|factor| json!({ "title": "✓", "value": factor }))
                        .collect::<Vec<_>>(),
                }
            ]
        }));
        body.push(json!({
            "type": "TextBlock",
            "text": "Get Your Free Case Evaluation",
            "weight": "Bolder",
            "wrap": true,
        }));
        body.push(lead_input("name", "Full Name", true));
        body.push(lead_input("phone", "Phone Number", true));
        body.push(lead_input("email", "Email (optional)", false));

        actions.push(json!({
            "type": "Action.Submit",
            "title": "Get My Free Evaluation",
            "data": {
                "quiz": {
                    "quizId": payload.quiz_id,
                    "mode": "lead",
                }
            }
        }));
    }

    json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.3",
        "body": body,
        "actions": actions,
    })
}

fn lead_input(id: &str, label: &str, required: bool) -> Value {
    json!({
        "type": "Input.Text",
        "id": id,
        "label": label,
        "isRequired": required,
    })
}

// Adaptive Cards only know named colors.
fn tier_card_color(tier: Tier) -> &'static str {
    match tier {
        Tier::High => "Good",
        Tier::Medium => "Warning",
        Tier::Low => "Accent",
    }
}
