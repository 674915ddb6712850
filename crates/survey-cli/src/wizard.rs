use std::fmt::Write;

use survey_spec::{FAILURE_MESSAGE, RenderPayload, RenderQuestion, SubmissionRecord};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: status, visible questions and answers so far.
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

/// Prints prompts and outcomes for the terminal wizard.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!(
            "Status: {} ({}/{})",
            payload.status.as_str(),
            payload.progress.answered,
            payload.progress.total
        );
        println!("Visible questions:");
        for question in payload.questions.iter().filter(|question| question.visible) {
            let mut entry = format!(" - {}", question.id);
            if !question.answer.is_empty() {
                entry.push_str(&format!(" = {}", question.answer));
            }
            if question.error {
                entry.push_str(" [missing]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.title);
        if prompt.error {
            line.push_str(" *");
        }
        println!("{}", line);
        if let Some(subtitle) = &prompt.subtitle {
            println!("{}", subtitle);
        }
        for (position, label) in prompt.labels.iter().enumerate() {
            println!("  {}. {}", position + 1, label);
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

    pub fn show_failure(&self, detail: &str) {
        eprintln!("{}", FAILURE_MESSAGE);
        if self.verbosity.is_verbose() {
            eprintln!("  Cause: {}", detail);
        }
    }

    pub fn show_completion(&self, route: &str, record: Option<&SubmissionRecord>) {
        println!("Done ✅ ({})", route);
        if self.verbosity.is_verbose()
            && let Some(record) = record
        {
            match record.to_cbor() {
                Ok(bytes) => println!("Report (CBOR hex): {}", encode_hex(&bytes)),
                Err(err) => eprintln!("Failed to serialize report to CBOR: {}", err),
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub subtitle: Option<String>,
    pub labels: Vec<String>,
    pub error: bool,
}

impl PromptContext {
    pub fn new(question: &RenderQuestion, payload: &RenderPayload) -> Self {
        Self {
            index: (payload.progress.answered + 1).max(1),
            total: payload.progress.total,
            title: question.title.clone(),
            subtitle: question.subtitle.clone(),
            labels: question
                .options
                .iter()
                .map(|option| option.label.clone())
                .collect(),
            error: question.error,
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

/// Maps raw input to an option value. Accepts the 1-based option number, the
/// option value or its label, ignoring case.
pub fn parse_choice(question: &RenderQuestion, raw: &str) -> Result<String, AnswerParseError> {
    let raw = raw.trim();
    if let Ok(position) = raw.parse::<usize>()
        && let Some(option) = position
            .checked_sub(1)
            .and_then(|index| question.options.get(index))
    {
        return Ok(option.value.clone());
    }

    question
        .options
        .iter()
        .find(|option| {
            option.value.eq_ignore_ascii_case(raw) || option.label.eq_ignore_ascii_case(raw)
        })
        .map(|option| option.value.clone())
        .ok_or_else(|| {
            let labels = question
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect::<Vec<_>>();
            let values = question
                .options
                .iter()
                .map(|option| option.value.as_str())
                .collect::<Vec<_>>();
            AnswerParseError::new(
                format!("Choose 1-{} or one of: {}.", labels.len(), labels.join(", ")),
                Some(format!("allowed values: {}", values.join(", "))),
            )
        })
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut encoded, "{:02x}", byte);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_spec::{QuestionId, SurveySpec, SurveyState, build_render_payload};

    fn question(id: QuestionId) -> RenderQuestion {
        let payload = build_render_payload(&SurveySpec::self_report(), &SurveyState::new());
        payload
            .questions
            .into_iter()
            .find(|question| question.id == id)
            .expect("question")
    }

    #[test]
    fn parses_number_value_and_label() {
        let gender = question(QuestionId::Gender);
        assert_eq!(parse_choice(&gender, "1").expect("number"), "male");
        assert_eq!(parse_choice(&gender, "FEMALE").expect("value"), "female");
        assert_eq!(parse_choice(&gender, "mujer").expect("label"), "female");
    }

    #[test]
    fn age_bands_parse_by_value() {
        let age = question(QuestionId::Age);
        assert_eq!(parse_choice(&age, "18-40").expect("band"), "18-40");
        assert_eq!(parse_choice(&age, "5").expect("number"), "65-100");
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        let fever = question(QuestionId::Fever);
        let err = parse_choice(&fever, "3").unwrap_err();
        assert!(err.user_message.contains("Choose 1-2"));
        assert!(parse_choice(&fever, "0").is_err());
        assert!(parse_choice(&fever, "maybe").is_err());
    }
}
