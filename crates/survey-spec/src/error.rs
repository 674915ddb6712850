use thiserror::Error;

use crate::question::QuestionId;

/// Errors raised by the survey model.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("'{value}' is not an option of question '{question}'")]
    InvalidOption { question: QuestionId, value: String },
    #[error("question '{0}' is not currently shown")]
    QuestionHidden(QuestionId),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cbor encode error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}
