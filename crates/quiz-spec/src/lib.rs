#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod events;
pub mod lead;
pub mod progress;
pub mod render;
pub mod score;
pub mod session;
pub mod spec;
pub mod template;
pub mod validate;

pub use answers::{AnswerSet, ValidationError, ValidationResult};
pub use answers_schema::{generate as answers_schema, quiz_spec_schema};
pub use events::{
    EventRecord, EventSink, LogSink, MemorySink, NullSink, QuizEvent, SessionId,
};
pub use lead::{LeadForm, LeadSubmission};
pub use progress::{Progress, next_question};
pub use render::{
    RenderPayload, RenderQuestion, RenderStatus, build_render_payload, render_card,
    render_json_ui, render_result_text, render_text,
};
pub use score::{MAX_SCORE, QualificationResult, Tier, score};
pub use session::{Advance, QuizSession, SessionError, advance};
pub use spec::{OptionSpec, QuestionSpec, QuizPresentation, QuizSpec, SpecError};
pub use template::{CopyTemplates, TemplateError};
pub use validate::validate;
