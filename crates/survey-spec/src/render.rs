use serde_json::{Value, json};

use crate::{
    progress::{answered_count, next_question, visible_count},
    question::QuestionId,
    spec::{form::SurveySpec, question::QuestionOption},
    state::SurveyState,
};

/// Message shown when the report store rejects a submission.
pub const FAILURE_MESSAGE: &str = "Se ha producido un error. Sus entradas no se han guardado. \
     Por favor, inténtelo de nuevo o póngase en contacto con nosotros.";

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A visible question still needs an answer.
    NeedInput,
    /// Every visible question is answered; ready to submit.
    Complete,
    /// A submission is in flight.
    Submitting,
    /// The last submission failed.
    Error,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
            RenderStatus::Submitting => "submitting",
            RenderStatus::Error => "error",
        }
    }
}

/// Progress counters exposed to renderers.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: QuestionId,
    pub title: String,
    pub subtitle: Option<String>,
    pub options: Vec<QuestionOption>,
    pub visible: bool,
    pub answer: String,
    pub error: bool,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub form_version: String,
    pub status: RenderStatus,
    pub next_question_id: Option<QuestionId>,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
    pub submit_enabled: bool,
    pub failure_message: Option<&'static str>,
}

/// Build the renderer payload from the catalog and the session state.
pub fn build_render_payload(spec: &SurveySpec, state: &SurveyState) -> RenderPayload {
    let status = state.status();
    let next_question_id = next_question(status);

    let questions = spec
        .questions
        .iter()
        .map(|question| {
            let current = status.get(question.id);
            RenderQuestion {
                id: question.id,
                title: question.title.clone(),
                subtitle: question.subtitle.clone(),
                options: question.options.clone(),
                visible: current.show,
                answer: current.answer.clone(),
                error: state.has_error(question.id),
            }
        })
        .collect();

    let render_status = if state.submit_in_progress() {
        RenderStatus::Submitting
    } else if state.submit_failed() {
        RenderStatus::Error
    } else if next_question_id.is_some() {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Complete
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        form_version: spec.version.clone(),
        status: render_status,
        next_question_id,
        progress: RenderProgress {
            answered: answered_count(status),
            total: visible_count(status),
        },
        questions,
        submit_enabled: state.submit_enabled(),
        failure_message: state.submit_failed().then_some(FAILURE_MESSAGE),
    }
}

/// Render the payload as a structured JSON value. Only visible questions are
/// listed.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .filter(|question| question.visible)
        .map(|question| {
            json!({
                "id": question.id,
                "title": question.title,
                "subtitle": question.subtitle,
                "options": question.options,
                "answer": question.answer,
                "error": question.error,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "form_version": payload.form_version,
        "status": payload.status.as_str(),
        "next_question_id": payload.next_question_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
        "submit_enabled": payload.submit_enabled,
        "failure_message": payload.failure_message,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));

    for question in payload.questions.iter().filter(|question| question.visible) {
        lines.push(String::new());
        let mut title = format!("[{}] {}", question.id, question.title);
        if question.error {
            title.push_str(" (!)");
        }
        lines.push(title);
        if let Some(subtitle) = &question.subtitle {
            lines.push(format!("  {}", subtitle));
        }
        for (position, option) in question.options.iter().enumerate() {
            let marker = if option.value == question.answer {
                "x"
            } else {
                " "
            };
            lines.push(format!("  [{}] {}. {}", marker, position + 1, option.label));
        }
    }

    if let Some(message) = payload.failure_message {
        lines.push(String::new());
        lines.push(message.to_string());
    }

    lines.join("\n")
}
