mod wizard;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use clap::{Parser, Subcommand, ValueEnum};
use component_survey::{
    ComponentConfig, FormStateSink, Navigator, OuterState, SubmitOutcome, SurveySession,
};
use survey_spec::{
    FormStatus, PartialStatus, SubmissionRecord, SurveySpec, SurveyState, ValidationResult,
    build_render_payload, partial_from_json, render_json_ui, render_text, validate_against,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{PromptContext, Verbosity, WizardPresenter, parse_choice};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "COVID-19 self-screening survey",
    long_about = "Runs the adaptive self-screening questionnaire in the terminal and stores completed reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Answer the survey interactively and store the report.
    Wizard {
        /// Optional JSON file with question states to resume from.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Optional JSON config (store_dir, collection, success_route).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Show verbose output (status, visible questions, failure causes).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Print the merged form state after a successful submit.
        #[arg(long)]
        answers_json: bool,
    },
    /// Print the question catalog as JSON.
    Describe,
    /// Check a question-state file the way submit would.
    Validate {
        /// Path to the question-state JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Render the survey for a given question-state file.
    Render {
        /// Optional question-state JSON file; defaults to a fresh survey.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the JSON Schema of stored reports.
    Schema,
}

/// Remembers where the session asked to go.
#[derive(Default)]
struct TerminalNavigator {
    route: Mutex<Option<String>>,
}

impl TerminalNavigator {
    fn route(&self) -> Option<String> {
        self.route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for TerminalNavigator {
    fn go_to(&self, route: &str) {
        debug!(route, "navigating");
        *self.route.lock().unwrap_or_else(PoisonError::into_inner) = Some(route.to_string());
    }
}

#[derive(Default)]
struct CollectedForm {
    merged: Mutex<Option<OuterState>>,
}

impl FormStateSink for CollectedForm {
    fn set_form_state(&self, merged: OuterState) {
        *self.merged.lock().unwrap_or_else(PoisonError::into_inner) = Some(merged);
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "self_report=info,component_survey=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Wizard {
            answers,
            config,
            verbose,
            answers_json,
        } => run_wizard(answers, config, verbose, answers_json).await,
        Command::Describe => run_describe(),
        Command::Validate { answers } => run_validate(&answers),
        Command::Render { answers, format } => run_render(answers.as_deref(), format),
        Command::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&SubmissionRecord::schema())?
            );
            Ok(())
        }
    }
}

/// Reads question states from a status map, a stored report line or a merged
/// form state; non-question keys are ignored.
fn read_prefill(path: Option<&Path>) -> CliResult<PartialStatus> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(partial_from_json(serde_json::from_str(&contents)?)?)
        }
        None => Ok(PartialStatus::new()),
    }
}

async fn run_wizard(
    answers_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    verbose: bool,
    answers_json: bool,
) -> CliResult<()> {
    let config = ComponentConfig::load(config_path.as_deref())?;
    let prefill = read_prefill(answers_path.as_deref())?;
    let session = SurveySession::new(
        config.jsonl_store(),
        TerminalNavigator::default(),
        CollectedForm::default(),
    )
    .with_prefill(prefill)
    .with_success_route(config.success_route.clone());

    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));

    loop {
        let payload = session.render();
        presenter.show_header(&payload);
        presenter.show_status(&payload);

        let Some(question_id) = payload.next_question_id else {
            match session.submit().await {
                SubmitOutcome::Submitted(record) => {
                    let route = session
                        .navigator()
                        .route()
                        .unwrap_or_else(|| config.success_route.clone());
                    presenter.show_completion(&route, Some(&record));
                    if answers_json {
                        println!("{}", serde_json::to_string_pretty(&session.outer_state())?);
                    }
                    return Ok(());
                }
                SubmitOutcome::Failed(detail) => {
                    presenter.show_failure(&detail);
                    if !prompt_retry()? {
                        return Err("report was not stored".into());
                    }
                }
                SubmitOutcome::Invalid(missing) => {
                    let names = missing.iter().map(|id| id.as_str()).collect::<Vec<_>>();
                    eprintln!("Missing answers: {}", names.join(", "));
                }
                SubmitOutcome::Busy => {}
            }
            continue;
        };

        let question = payload
            .questions
            .iter()
            .find(|question| question.id == question_id)
            .ok_or_else(|| format!("render payload missing question '{}'", question_id))?;
        let prompt = PromptContext::new(question, &payload);

        let value = loop {
            presenter.show_prompt(&prompt);
            let input = read_input()?;
            if input.eq_ignore_ascii_case("exit") {
                return Err("wizard aborted by user".into());
            }
            match parse_choice(question, &input) {
                Ok(value) => break value,
                Err(err) => presenter.show_parse_error(&err),
            }
        };

        session.select(question_id, Some(value.as_str()))?;
    }
}

fn read_input() -> CliResult<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err("input closed before the survey was complete".into());
    }
    Ok(input.trim().to_string())
}

fn prompt_retry() -> CliResult<bool> {
    print!("Retry? [Y/n]: ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "" | "y" | "yes" | "s" | "si" | "sí"
    ))
}

fn run_describe() -> CliResult<()> {
    let spec = SurveySpec::self_report();
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

fn run_validate(answers_path: &Path) -> CliResult<()> {
    let status = FormStatus::with_prefill(read_prefill(Some(answers_path))?);

    let result = validate_against(&SurveySpec::self_report(), &status);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.missing_required.is_empty() {
        let names = result
            .missing_required
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>();
        println!("Missing required answers: {}", names.join(", "));
    }
    if !result.invalid_options.is_empty() {
        let names = result
            .invalid_options
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>();
        println!("Answers outside the options: {}", names.join(", "));
    }
}

fn run_render(answers_path: Option<&Path>, mode: RenderMode) -> CliResult<()> {
    let state = SurveyState::with_prefill(read_prefill(answers_path)?);
    let payload = build_render_payload(&SurveySpec::self_report(), &state);
    match mode {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
    }
    Ok(())
}
