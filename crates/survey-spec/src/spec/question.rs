use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// Age ranges offered by the `age` question.
pub const AGE_BANDS: [&str; 5] = ["0-13", "13-18", "18-40", "40-65", "65-100"];

/// Selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Presentation of a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub options: Vec<QuestionOption>,
}

impl QuestionSpec {
    /// Question answered with `Sí`/`No`.
    pub fn yes_no(id: QuestionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            subtitle: None,
            options: vec![
                QuestionOption::new("yes", "Sí"),
                QuestionOption::new("no", "No"),
            ],
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Whether `value` is one of the option values.
    pub fn accepts(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}
