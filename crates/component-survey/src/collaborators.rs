//! Seams to the systems a session talks to but does not own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use survey_spec::SubmissionRecord;

use crate::error::StoreError;

/// State of a surrounding multi-step flow, keyed by field name.
pub type OuterState = Map<String, Value>;

/// Append-only destination for completed reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Store clock used to stamp a record at write time.
    fn now(&self) -> DateTime<Utc>;

    /// Writes one record. Called at most once per submit attempt.
    async fn append(&self, record: SubmissionRecord) -> Result<(), StoreError>;
}

/// Moves the user to another view.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn go_to(&self, route: &str);
}

/// Receives the merged outer state after a successful submit.
#[cfg_attr(test, mockall::automock)]
pub trait FormStateSink: Send + Sync {
    fn set_form_state(&self, merged: OuterState);
}
