use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SurveyError;
use crate::status::FormStatus;

/// Completed survey as written to the report store: every question state
/// plus the time the store accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub answers: FormStatus,
    #[serde(rename = "reportDate")]
    pub report_date: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(answers: FormStatus, report_date: DateTime<Utc>) -> Self {
        Self {
            answers,
            report_date,
        }
    }

    pub fn to_json(&self) -> Result<Value, SurveyError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_line(&self) -> Result<String, SurveyError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SurveyError> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// JSON Schema of the stored document.
    pub fn schema() -> Value {
        serde_json::to_value(schemars::schema_for!(SubmissionRecord)).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionId;
    use crate::status::{PartialStatus, QuestionState};
    use chrono::TimeZone;

    fn record() -> SubmissionRecord {
        let answers = FormStatus::with_prefill(PartialStatus::from([(
            QuestionId::Gender,
            QuestionState::answered("male"),
        )]));
        let at = Utc.with_ymd_and_hms(2020, 3, 20, 12, 0, 0).unwrap();
        SubmissionRecord::new(answers, at)
    }

    #[test]
    fn json_is_flat_question_map_with_report_date() {
        let value = record().to_json().expect("json");
        assert_eq!(value["gender"]["answer"], "male");
        assert_eq!(value["reportDate"], "2020-03-20T12:00:00Z");
        assert_eq!(value.as_object().map(|map| map.len()), Some(11));
    }

    #[test]
    fn json_line_reads_back() {
        let line = record().to_json_line().expect("line");
        assert!(!line.contains('\n'));
        let parsed: SubmissionRecord = serde_json::from_str(&line).expect("parse");
        assert_eq!(parsed, record());
    }

    #[test]
    fn cbor_encoding_is_not_empty() {
        let bytes = record().to_cbor().expect("cbor");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn schema_describes_report_date() {
        let schema = SubmissionRecord::schema();
        assert!(schema["properties"]["reportDate"].is_object());
    }
}
