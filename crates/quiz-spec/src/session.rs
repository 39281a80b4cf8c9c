use thiserror::Error;

use crate::answers::AnswerSet;
use crate::events::{EventRecord, EventSink, NullSink, QuizEvent, SessionId};
use crate::lead::{LeadForm, LeadSubmission};
use crate::score::{QualificationResult, score};
use crate::spec::{QuestionSpec, QuizSpec};

/// Rejections raised by session transitions. A rejected call leaves the
/// session unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("expected an answer for '{expected}', got '{actual}'")]
    QuestionMismatch { expected: String, actual: String },
    #[error("step {0} is outside the quiz")]
    StepOutOfRange(usize),
    #[error("step {step} expects the earlier questions answered, found {answered} answers")]
    AnswersOutOfStep { step: usize, answered: usize },
    #[error("'{value}' is not an option of question '{question_id}'")]
    UnknownOption { question_id: String, value: String },
    #[error("quiz is already complete")]
    AlreadyComplete,
    #[error("quiz is not complete yet")]
    NotComplete,
    #[error("lead form is missing required fields: {}", .0.join(", "))]
    MissingLeadFields(Vec<String>),
    #[error("lead was already submitted")]
    AlreadySubmitted,
}

impl SessionError {
    /// Stable machine-readable code for error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::QuestionMismatch { .. } => "question_mismatch",
            SessionError::StepOutOfRange(_) => "step_out_of_range",
            SessionError::AnswersOutOfStep { .. } => "answers_out_of_step",
            SessionError::UnknownOption { .. } => "invalid_option",
            SessionError::AlreadyComplete => "already_complete",
            SessionError::NotComplete => "not_complete",
            SessionError::MissingLeadFields(_) => "missing_lead_fields",
            SessionError::AlreadySubmitted => "already_submitted",
        }
    }
}

/// Where the quiz goes after an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Complete(QualificationResult),
}

/// Records the answer for `step` and decides the next position.
///
/// `answers` must hold exactly the questions before `step`, `question_id`
/// must be the id of the question at `step` and `value` one of its option
/// values. Answering the last question scores the set.
pub fn advance(
    spec: &QuizSpec,
    step: usize,
    answers: &AnswerSet,
    question_id: &str,
    value: &str,
) -> Result<(AnswerSet, Advance), SessionError> {
    let question = spec
        .questions
        .get(step)
        .ok_or(SessionError::StepOutOfRange(step))?;
    if answers.len() != step
        || spec.questions[..step]
            .iter()
            .any(|earlier| !answers.contains(&earlier.id))
    {
        return Err(SessionError::AnswersOutOfStep {
            step,
            answered: answers.len(),
        });
    }
    if question.id != question_id {
        return Err(SessionError::QuestionMismatch {
            expected: question.id.clone(),
            actual: question_id.to_string(),
        });
    }
    if !question.accepts(value) {
        return Err(SessionError::UnknownOption {
            question_id: question_id.to_string(),
            value: value.to_string(),
        });
    }

    let next_answers = answers.with_answer(question_id, value);
    let outcome = if step >= spec.last_index() {
        Advance::Complete(score(&next_answers))
    } else {
        Advance::Next(step + 1)
    };
    Ok((next_answers, outcome))
}

/// Live state of one visitor working through the quiz.
pub struct QuizSession<S: EventSink = NullSink> {
    spec: QuizSpec,
    session_id: SessionId,
    step: usize,
    answers: AnswerSet,
    result: Option<QualificationResult>,
    lead: Option<LeadForm>,
    sink: S,
}

impl QuizSession<NullSink> {
    pub fn new(spec: QuizSpec) -> Self {
        Self::with_sink(spec, SessionId::generate(), NullSink)
    }
}

impl<S: EventSink> QuizSession<S> {
    /// Starts a session at step 0 and emits `quiz_started`.
    pub fn with_sink(spec: QuizSpec, session_id: SessionId, sink: S) -> Self {
        let answers = AnswerSet::new(spec.id.clone(), spec.version.clone());
        let mut session = Self {
            spec,
            session_id,
            step: 0,
            answers,
            result: None,
            lead: None,
            sink,
        };
        session.emit(QuizEvent::QuizStarted {
            total_steps: session.spec.total(),
        });
        session
    }

    pub fn spec(&self) -> &QuizSpec {
        &self.spec
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn result(&self) -> Option<&QualificationResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_submitted(&self) -> bool {
        self.lead.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Question awaiting an answer, `None` once the result is attached.
    pub fn current_question(&self) -> Option<&QuestionSpec> {
        if self.is_complete() {
            None
        } else {
            self.spec.questions.get(self.step)
        }
    }

    /// Percentage shown by the progress bar for the current step.
    pub fn progress_percent(&self) -> u32 {
        crate::progress::percent(self.step, self.spec.total())
    }

    /// Answers the current question, emitting `question_answered` and,
    /// on the last question, `quiz_completed`.
    pub fn advance(&mut self, question_id: &str, value: &str) -> Result<Advance, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete);
        }

        let (answers, outcome) = advance(&self.spec, self.step, &self.answers, question_id, value)?;
        log::debug!(
            "session {} answered {}={} at step {}",
            self.session_id,
            question_id,
            value,
            self.step
        );
        self.answers = answers;
        self.emit(QuizEvent::QuestionAnswered {
            step: self.step + 1,
            question_id: question_id.to_string(),
            answer: value.to_string(),
        });

        match &outcome {
            Advance::Next(next) => self.step = *next,
            Advance::Complete(result) => {
                self.result = Some(result.clone());
                self.emit(QuizEvent::QuizCompleted {
                    score: result.score,
                    qualification_level: result.tier.as_str().to_string(),
                    factors: result.factors.clone(),
                });
            }
        }
        Ok(outcome)
    }

    /// Submits the lead form once the result is known. Succeeds at most once.
    pub fn submit_lead(&mut self, lead: LeadForm) -> Result<LeadSubmission, SessionError> {
        let qualification = self.result.clone().ok_or(SessionError::NotComplete)?;
        if self.lead.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        let missing = lead.missing_required();
        if !missing.is_empty() {
            return Err(SessionError::MissingLeadFields(missing));
        }

        self.emit(QuizEvent::LeadSubmitted {
            qualification_level: Some(qualification.tier.as_str().to_string()),
            has_phone: !lead.phone.trim().is_empty(),
            has_email: lead.has_email(),
        });
        self.lead = Some(lead.clone());
        Ok(LeadSubmission {
            session_id: self.session_id.clone(),
            lead,
            answers: self.answers.clone(),
            qualification,
        })
    }

    /// Best-effort notice that the visitor is leaving the quiz.
    pub fn abandon(&mut self) {
        let last_question_id = self
            .spec
            .questions
            .get(self.step)
            .map(|question| question.id.clone());
        self.emit(QuizEvent::ExitIntent {
            current_step: self.step + 1,
            last_question_id,
            answered_questions: self.answers.len(),
        });
    }

    fn emit(&mut self, event: QuizEvent) {
        let record = EventRecord::new(&self.session_id, &event);
        self.sink.record(record);
    }
}
