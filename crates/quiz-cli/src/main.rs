mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use quiz_component::{
    render_card as quiz_render_card, render_json_ui as quiz_render_json_ui, score_answers,
    validate_answers,
};
use quiz_spec::{
    CopyTemplates, LeadForm, LogSink, QuizSession, QuizSpec, SessionId, answers_schema,
    quiz_spec_schema,
};
use serde_json::{Value, json};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use wizard::{PromptContext, Verbosity, WizardPresenter, parse_answer};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "SSD qualification quiz",
    long_about = "Runs the disability qualification quiz in a terminal and exposes scoring and validation helpers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RenderMode {
    Text,
    Card,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Take the quiz interactively, then fill in the lead form.
    Wizard {
        /// Quiz definition JSON (defaults to the built-in SSD quiz).
        #[arg(long, value_name = "SPEC", env = "SSD_QUIZ_SPEC")]
        spec: Option<PathBuf>,
        /// Show verbose output (option tokens, parse expectations, payloads).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also emit answer JSON at the end.
        #[arg(long)]
        answers_json: bool,
        /// Additional render output printed before each question.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
        /// Pause between an answer and the next question, in milliseconds.
        #[arg(long, env = "SSD_QUIZ_DELAY_MS", default_value_t = 300)]
        delay_ms: u64,
        /// Stop after the result instead of collecting contact details.
        #[arg(long)]
        no_lead: bool,
    },
    /// Score an answers JSON file.
    Score {
        /// Path to a `{question_id: value}` JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Validate an answers JSON file against the quiz.
    Validate {
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, value_name = "SPEC", env = "SSD_QUIZ_SPEC")]
        spec: Option<PathBuf>,
    },
    /// Print the quiz definition.
    Describe {
        #[arg(long, value_name = "SPEC", env = "SSD_QUIZ_SPEC")]
        spec: Option<PathBuf>,
    },
    /// Print a JSON schema: the quiz format, or with --answers the answer document.
    Schema {
        #[arg(long)]
        answers: bool,
        #[arg(long, value_name = "SPEC", env = "SSD_QUIZ_SPEC")]
        spec: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Wizard {
            spec,
            verbose,
            answers_json,
            format,
            delay_ms,
            no_lead,
        } => run_wizard(WizardOptions {
            spec,
            verbose,
            answers_json,
            format,
            delay: Duration::from_millis(delay_ms),
            collect_lead: !no_lead,
        }),
        Command::Score { answers } => run_score(answers),
        Command::Validate { answers, spec } => run_validate(spec, answers),
        Command::Describe { spec } => run_describe(spec),
        Command::Schema { answers, spec } => run_schema(answers, spec),
    }
}

struct WizardOptions {
    spec: Option<PathBuf>,
    verbose: bool,
    answers_json: bool,
    format: RenderMode,
    delay: Duration,
    collect_lead: bool,
}

/// Reads the quiz JSON from `path`, or the built-in quiz.
fn load_spec(path: Option<&PathBuf>) -> CliResult<(QuizSpec, String)> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)?,
        None => QuizSpec::builtin_json().to_string(),
    };
    let spec = QuizSpec::from_json(&raw)?;
    Ok((spec, raw))
}

fn run_wizard(options: WizardOptions) -> CliResult<()> {
    let (spec, raw_spec) = load_spec(options.spec.as_ref())?;
    let config_json = json!({ "quiz_spec_json": raw_spec }).to_string();
    let templates = CopyTemplates::new()?;
    let mut presenter =
        WizardPresenter::new(Verbosity::from_verbose(options.verbose), options.answers_json);

    let mut session = QuizSession::with_sink(spec, SessionId::generate(), LogSink);
    log::debug!("started quiz session {}", session.session_id());
    presenter.show_header(session.spec());

    while let Some(question) = session.current_question().cloned() {
        let answers_json = answers_to_json(session.answers());
        print_render_output(options.format, &session.spec().id, &config_json, &answers_json)?;

        let prompt = PromptContext::new(&question, session.step(), session.spec().total());
        let value = loop {
            presenter.show_prompt(&prompt);
            let Some(input) = read_answer_line()? else {
                session.abandon();
                return Err("quiz aborted: input closed".into());
            };
            if input.eq_ignore_ascii_case("exit") {
                session.abandon();
                return Err("quiz aborted by user".into());
            }
            match parse_answer(&question, &input) {
                Ok(value) => break value,
                Err(err) => presenter.show_parse_error(&err),
            }
        };

        session.advance(&question.id, &value)?;
        if !options.delay.is_zero() {
            thread::sleep(options.delay);
        }
    }

    let result = session
        .result()
        .cloned()
        .ok_or("quiz finished without a result")?;
    presenter.show_result(&templates.result_banner(&result)?);
    if options.format != RenderMode::Text {
        let answers_json = answers_to_json(session.answers());
        print_render_output(options.format, &session.spec().id, &config_json, &answers_json)?;
    }

    if options.collect_lead {
        println!();
        println!("Get Your Free Case Evaluation");
        let Some(lead) = prompt_lead()? else {
            session.abandon();
            return Err("quiz aborted: input closed".into());
        };
        let submission = session.submit_lead(lead)?;
        presenter.show_submission(&templates.thank_you(&submission.lead)?, &submission);
    }

    presenter.show_completion(session.answers());
    Ok(())
}

fn answers_to_json(answers: &quiz_spec::AnswerSet) -> String {
    serde_json::to_string(&answers.answers).unwrap_or_else(|_| "{}".to_string())
}

/// Returns `None` once stdin is closed.
fn read_answer_line() -> CliResult<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn prompt_line(prompt: &str) -> CliResult<Option<String>> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_non_empty(prompt: &str) -> CliResult<Option<String>> {
    loop {
        match prompt_line(prompt)? {
            None => return Ok(None),
            Some(value) if !value.is_empty() => return Ok(Some(value)),
            Some(_) => println!("Value cannot be empty."),
        }
    }
}

fn prompt_lead() -> CliResult<Option<LeadForm>> {
    let Some(name) = prompt_non_empty("Full Name (required)")? else {
        return Ok(None);
    };
    let Some(phone) = prompt_non_empty("Phone Number (required)")? else {
        return Ok(None);
    };
    let email = prompt_line("Email (optional)")?.filter(|email| !email.is_empty());
    Ok(Some(LeadForm::new(name, phone, email)))
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn run_score(answers_path: PathBuf) -> CliResult<()> {
    let answers_json = fs::read_to_string(answers_path)?;
    let result = parse_component_result(&score_answers(&answers_json))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_validate(spec_path: Option<PathBuf>, answers_path: PathBuf) -> CliResult<()> {
    let (spec, raw_spec) = load_spec(spec_path.as_ref())?;
    let config_json = json!({ "quiz_spec_json": raw_spec }).to_string();
    let answers_json = fs::read_to_string(answers_path)?;
    let result = parse_component_result(&validate_answers(&spec.id, &config_json, &answers_json))?;

    let valid = result["valid"].as_bool().unwrap_or(false);
    println!(
        "Validation result: {}",
        if valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &Value) {
    let strings = |key: &str| -> Vec<String> {
        result[key]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    if let Some(errors) = result["errors"].as_array().filter(|errors| !errors.is_empty()) {
        println!("Errors:");
        for error in errors {
            println!(
                "  {} - {}",
                error["path"].as_str().unwrap_or("<unknown>"),
                error["message"].as_str().unwrap_or("validation failed")
            );
        }
    }
    let missing = strings("missing_required");
    if !missing.is_empty() {
        println!("Missing required answers: {}", missing.join(", "));
    }
    let unknown = strings("unknown_fields");
    if !unknown.is_empty() {
        println!("Unknown answer fields: {}", unknown.join(", "));
    }
}

fn run_describe(spec_path: Option<PathBuf>) -> CliResult<()> {
    let (spec, _) = load_spec(spec_path.as_ref())?;
    println!("{} ({} v{})", spec.title, spec.id, spec.version);
    for (index, question) in spec.questions.iter().enumerate() {
        println!("{}. [{}] {}", index + 1, question.id, question.prompt);
        for option in &question.options {
            println!("     {} {} = {}", option.icon, option.label, option.value);
        }
    }
    Ok(())
}

fn run_schema(answers: bool, spec_path: Option<PathBuf>) -> CliResult<()> {
    let schema = if answers {
        let (spec, _) = load_spec(spec_path.as_ref())?;
        answers_schema(&spec)
    } else {
        quiz_spec_schema()?
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn print_render_output(
    mode: RenderMode,
    quiz_id: &str,
    config_json: &str,
    answers_json: &str,
) -> CliResult<()> {
    match mode {
        RenderMode::Text => Ok(()),
        RenderMode::Card => {
            let card = parse_component_result(&quiz_render_card(quiz_id, config_json, answers_json))?;
            println!("Adaptive card:\n{}", card);
            Ok(())
        }
        RenderMode::Json => {
            let ui = parse_component_result(&quiz_render_json_ui(quiz_id, config_json, answers_json))?;
            println!("JSON UI:\n{}", ui);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use std::fs;
    use tempfile::TempDir;

    fn builtin_question(id: &str) -> quiz_spec::QuestionSpec {
        QuizSpec::builtin()
            .unwrap()
            .question(id)
            .cloned()
            .expect("question")
    }

    fn quiz_cmd() -> Command {
        let mut cmd = Command::cargo_bin("ssd-quiz").expect("binary");
        cmd.env_remove("SSD_QUIZ_SPEC").env_remove("SSD_QUIZ_DELAY_MS");
        cmd
    }

    #[test]
    fn parse_answer_accepts_option_number() {
        let question = builtin_question("work_history");
        assert_eq!(parse_answer(&question, "2").unwrap(), "yes_older");
    }

    #[test]
    fn parse_answer_accepts_token_and_label() {
        let question = builtin_question("applied");
        assert_eq!(parse_answer(&question, "DENIED").unwrap(), "denied");
        assert_eq!(
            parse_answer(&question, "yes, my application is pending").unwrap(),
            "pending"
        );
    }

    #[test]
    fn parse_answer_rejects_out_of_range_and_blank() {
        let question = builtin_question("condition");
        assert!(parse_answer(&question, "0").is_err());
        assert!(parse_answer(&question, "3").is_err());
        let err = parse_answer(&question, "  ").unwrap_err();
        assert_eq!(err.user_message, "This question requires an answer.");
    }

    #[test]
    fn wizard_runs_through_result_and_lead() {
        let stdin = ["1", "1", "1", "1", "3", "Jane Doe", "555-0100", ""].join("\n") + "\n";
        let output = quiz_cmd()
            .args(["wizard", "--delay-ms", "0", "--answers-json"])
            .write_stdin(stdin)
            .output()
            .expect("run wizard");
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Question 1 of 5 (20% complete)"));
        assert!(stdout.contains("You May Strongly Qualify (score 100/100)"));
        assert!(stdout.contains("Thank You, Jane!"));
        assert!(stdout.contains("\"applied\": \"denied\""));
    }

    #[test]
    fn wizard_reprompts_on_invalid_answer() {
        let stdin = ["maybe", "no", "2", "3", "3", "1"].join("\n") + "\n";
        let output = quiz_cmd()
            .args(["wizard", "--delay-ms", "0", "--no-lead"])
            .write_stdin(stdin)
            .output()
            .expect("run wizard");
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid answer: Choose one of: yes, no."));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("We Should Review Your Case (score 5/100)"));
        assert!(!stdout.contains("Thank You"));
    }

    #[test]
    fn wizard_exit_aborts() {
        quiz_cmd()
            .args(["wizard", "--delay-ms", "0"])
            .write_stdin("1\nexit\n")
            .assert()
            .failure();
    }

    #[test]
    fn wizard_reports_exit_intent_when_stdin_closes() {
        let output = quiz_cmd()
            .arg("wizard")
            .env("SSD_QUIZ_DELAY_MS", "0")
            .env("RUST_LOG", "info")
            .write_stdin("")
            .output()
            .expect("run wizard");
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("quiz aborted: input closed"));
        assert!(stderr.contains("funnel event exit_intent"));
        assert!(stderr.contains("\"answered_questions\":0"));
    }

    #[test]
    fn wizard_reads_delay_from_env() {
        let output = quiz_cmd()
            .arg("wizard")
            .env("SSD_QUIZ_DELAY_MS", "soon")
            .write_stdin("")
            .output()
            .expect("run wizard");
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("invalid value 'soon'"));
        assert!(!String::from_utf8_lossy(&output.stdout).contains("Question 1 of 5"));
    }

    #[test]
    fn schema_command_uses_spec_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("quiz.json");
        let spec = json!({
            "id": "mini",
            "title": "Mini",
            "version": "1.0",
            "questions": [
                { "id": "veteran", "prompt": "?", "options": [
                    { "value": "yes", "label": "Yes" },
                    { "value": "no", "label": "No" }
                ]}
            ]
        });
        fs::write(&path, spec.to_string()).expect("write spec");

        let output = quiz_cmd()
            .args(["schema", "--answers", "--spec"])
            .arg(&path)
            .output()
            .expect("run schema");
        assert!(output.status.success());
        let schema: Value = serde_json::from_slice(&output.stdout).expect("json output");
        assert!(schema["properties"].get("veteran").is_some());
        assert!(schema["properties"].get("condition").is_none());
    }

    #[test]
    fn score_command_prints_result() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("answers.json");
        fs::write(
            &path,
            json!({
                "condition": "yes",
                "duration": "yes",
                "work_history": "yes_older",
                "treatment": "yes_some",
                "applied": "pending"
            })
            .to_string(),
        )
        .expect("write answers");

        let output = quiz_cmd()
            .arg("score")
            .arg("--answers")
            .arg(&path)
            .output()
            .expect("run score");
        assert!(output.status.success());
        let result: Value = serde_json::from_slice(&output.stdout).expect("json output");
        assert_eq!(result["score"], 73);
        assert_eq!(result["tier"], "high");
    }

    #[test]
    fn validate_command_fails_on_incomplete_answers() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"condition": "yes", "color": "blue"}"#).expect("write answers");

        let output = quiz_cmd()
            .arg("validate")
            .arg("--answers")
            .arg(&path)
            .output()
            .expect("run validate");
        assert!(!output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validation result: invalid"));
        assert!(stdout.contains("Unknown answer fields: color"));
    }
}
