use thiserror::Error;

use survey_spec::SurveyError;

/// Failure reported by a report store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] SurveyError),
    #[error("report rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Survey(#[from] SurveyError),
}
