use std::fmt::Write;

use quiz_spec::{AnswerSet, LeadSubmission, QuestionSpec, QuizSpec};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: progress, option tokens, parse expectations, payloads.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts, results and the closing summary.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, spec: &QuizSpec) {
        if self.header_printed {
            return;
        }
        println!("{}", spec.title);
        if let Some(help) = spec.help() {
            println!("{}", help);
        }
        self.header_printed = true;
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        println!();
        println!("{} ({}% complete)", prompt.counter, prompt.percent);
        println!("{}", prompt.prompt);
        if let Some(subtext) = &prompt.subtext {
            println!("{}", subtext);
        }
        for (index, option) in prompt.options.iter().enumerate() {
            if self.verbosity.is_verbose() {
                println!("  {}) {} {} [{}]", index + 1, option.1, option.2, option.0);
            } else {
                println!("  {}) {} {}", index + 1, option.1, option.2);
            }
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_result(&self, banner: &str) {
        println!();
        println!("{}", banner.trim_end());
    }

    pub fn show_submission(&self, thank_you: &str, submission: &LeadSubmission) {
        println!();
        println!("{}", thank_you);
        if self.verbosity.is_verbose() {
            match serde_json::to_string_pretty(submission) {
                Ok(pretty) => println!("Lead payload:\n{}", pretty),
                Err(err) => eprintln!("Failed to serialize lead payload: {}", err),
            }
        }
    }

    pub fn show_completion(&self, answer_set: &AnswerSet) {
        if self.verbosity.is_verbose() {
            match answer_set.to_cbor() {
                Ok(bytes) => println!("Answers (CBOR hex): {}", encode_hex(&bytes)),
                Err(err) => eprintln!("Failed to serialize answers to CBOR: {}", err),
            }
        }
        if self.show_answers_json {
            match answer_set.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub counter: String,
    pub percent: u32,
    pub prompt: String,
    pub subtext: Option<String>,
    /// `(value, icon, label)` per option, in display order.
    pub options: Vec<(String, String, String)>,
}

impl PromptContext {
    pub fn new(question: &QuestionSpec, step: usize, total: usize) -> Self {
        Self {
            counter: quiz_spec::progress::counter_label(step, total),
            percent: quiz_spec::progress::percent(step, total),
            prompt: question.prompt.clone(),
            subtext: question.subtext.clone(),
            options: question
                .options
                .iter()
                .map(|option| {
                    (
                        option.value.clone(),
                        option.icon.clone(),
                        option.label.clone(),
                    )
                })
                .collect(),
        }
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Maps raw input to an option value: a 1-based option number, the value
/// token, or the option label (case-insensitive).
pub fn parse_answer(question: &QuestionSpec, raw: &str) -> Result<String, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AnswerParseError::new(
            "This question requires an answer.",
            None,
        ));
    }

    if let Ok(index) = raw.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|index| question.options.get(index))
            .map(|option| option.value.clone())
            .ok_or_else(|| {
                AnswerParseError::new(
                    format!("Choose a number between 1 and {}.", question.options.len()),
                    Some(format!("option index {} is out of range", index)),
                )
            });
    }

    question
        .options
        .iter()
        .find(|option| option.value.eq_ignore_ascii_case(raw) || option.label.eq_ignore_ascii_case(raw))
        .map(|option| option.value.clone())
        .ok_or_else(|| {
            let allowed = question.option_values();
            AnswerParseError::new(
                format!("Choose one of: {}.", allowed.join(", ")),
                Some(format!("allowed values: {}", allowed.join(", "))),
            )
        })
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
