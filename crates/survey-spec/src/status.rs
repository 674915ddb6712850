use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::SurveyError;

use crate::question::QuestionId;

/// Per-question display and answer state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionState {
    pub show: bool,
    /// Selected option value; empty means unanswered.
    #[serde(default)]
    pub answer: String,
}

static HIDDEN: QuestionState = QuestionState {
    show: false,
    answer: String::new(),
};

impl QuestionState {
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Visible with no answer recorded.
    pub fn shown() -> Self {
        Self {
            show: true,
            answer: String::new(),
        }
    }

    pub fn answered(value: impl Into<String>) -> Self {
        Self {
            show: true,
            answer: value.into(),
        }
    }

    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Visible but still waiting for an answer.
    pub fn is_pending(&self) -> bool {
        self.show && self.answer.is_empty()
    }
}

/// Caller-supplied subset of question states, used to resume a session.
pub type PartialStatus = BTreeMap<QuestionId, QuestionState>;

/// Question states found in a JSON object. Keys that are not question ids,
/// such as a stored report's `reportDate` or outer form fields, are skipped.
pub fn partial_from_json(value: Value) -> Result<PartialStatus, SurveyError> {
    let fields: Map<String, Value> = serde_json::from_value(value)?;
    let mut partial = PartialStatus::new();
    for (key, entry) in fields {
        if let Ok(id) = key.parse::<QuestionId>() {
            partial.insert(id, serde_json::from_value(entry)?);
        }
    }
    Ok(partial)
}

/// Per-question flag set when a visible question was left unanswered at submit.
pub type ErrorMap = BTreeMap<QuestionId, bool>;

/// Error map with every question cleared.
pub fn blank_errors() -> ErrorMap {
    QuestionId::SEQUENCE.iter().map(|id| (*id, false)).collect()
}

/// State of every question in the survey. Always holds exactly one entry per
/// [`QuestionId`], and a hidden question never carries an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FormStatus(BTreeMap<QuestionId, QuestionState>);

impl FormStatus {
    /// First question visible, everything else hidden.
    pub fn new() -> Self {
        let states = QuestionId::SEQUENCE
            .iter()
            .map(|id| {
                let state = if *id == QuestionId::FIRST {
                    QuestionState::shown()
                } else {
                    QuestionState::hidden()
                };
                (*id, state)
            })
            .collect();
        Self(states)
    }

    /// Defaults overlaid with `prefill`; pre-filled entries win.
    pub fn with_prefill(prefill: PartialStatus) -> Self {
        let mut status = Self::new();
        for (id, state) in prefill {
            status.set(id, state);
        }
        status
    }

    pub fn get(&self, id: QuestionId) -> &QuestionState {
        self.0.get(&id).unwrap_or(&HIDDEN)
    }

    pub fn answer(&self, id: QuestionId) -> &str {
        &self.get(id).answer
    }

    pub fn is_shown(&self, id: QuestionId) -> bool {
        self.get(id).show
    }

    /// Replaces the state of `id`, clearing the answer of hidden entries.
    pub fn set(&mut self, id: QuestionId, mut state: QuestionState) {
        if !state.show {
            state.answer.clear();
        }
        self.0.insert(id, state);
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &QuestionState)> {
        self.0.iter().map(|(id, state)| (*id, state))
    }

    pub fn visible(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.iter()
            .filter(|(_, state)| state.show)
            .map(|(id, _)| id)
    }
}

impl Default for FormStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for FormStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let partial = PartialStatus::deserialize(deserializer)?;
        Ok(FormStatus::with_prefill(partial))
    }
}
