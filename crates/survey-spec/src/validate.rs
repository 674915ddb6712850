use serde::Serialize;

use crate::question::QuestionId;
use crate::spec::form::SurveySpec;
use crate::status::{ErrorMap, FormStatus};

/// Outcome of checking a [`FormStatus`] before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Visible questions left without an answer.
    pub missing_required: Vec<QuestionId>,
    /// Answers that are not one of the question's option values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_options: Vec<QuestionId>,
    pub errors: ErrorMap,
}

/// Every visible question is required; hidden questions are never checked.
pub fn validate(status: &FormStatus) -> ValidationResult {
    let errors = validation_errors(status);
    let missing_required: Vec<_> = errors
        .iter()
        .filter(|(_, missing)| **missing)
        .map(|(id, _)| *id)
        .collect();

    ValidationResult {
        valid: missing_required.is_empty(),
        missing_required,
        invalid_options: Vec::new(),
        errors,
    }
}

/// Like [`validate`], additionally rejecting answers outside the catalog
/// options. Used for pre-filled or externally supplied answers.
pub fn validate_against(spec: &SurveySpec, status: &FormStatus) -> ValidationResult {
    let mut result = validate(status);
    result.invalid_options = status
        .iter()
        .filter(|(_, state)| state.is_answered())
        .filter(|(id, state)| {
            spec.question(*id)
                .map(|question| !question.accepts(&state.answer))
                .unwrap_or(true)
        })
        .map(|(id, _)| id)
        .collect();
    result.valid = result.valid && result.invalid_options.is_empty();
    result
}

/// Fresh error map: `true` for each visible question without an answer.
pub fn validation_errors(status: &FormStatus) -> ErrorMap {
    status
        .iter()
        .map(|(id, state)| (id, state.is_pending()))
        .collect()
}
