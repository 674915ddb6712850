use serde::{Deserialize, Serialize};

use crate::error::SurveyError;
use crate::question::QuestionId;
use crate::spec::form::SurveySpec;
use crate::status::{ErrorMap, FormStatus, PartialStatus, QuestionState, blank_errors};
use crate::transition::{Next, Transition, resolve, successor};
use crate::validate::validation_errors;

/// Result of asking to submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitGate {
    /// A submission is already in flight; nothing was done.
    Busy,
    /// Visible questions are unanswered; their error flags are now set and
    /// submitting is enabled again.
    Invalid(Vec<QuestionId>),
    /// Validation passed. The snapshot must be persisted and the outcome
    /// reported through [`SurveyState::finish_submit`].
    Ready(FormStatus),
}

/// Everything one survey session owns: question states, error flags and the
/// submission status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyState {
    status: FormStatus,
    errors: ErrorMap,
    #[serde(default)]
    submit_in_progress: bool,
    #[serde(default)]
    submit_failed: bool,
}

impl SurveyState {
    pub fn new() -> Self {
        Self::with_prefill(PartialStatus::new())
    }

    /// Resumes a session from previously captured question states.
    pub fn with_prefill(prefill: PartialStatus) -> Self {
        Self {
            status: FormStatus::with_prefill(prefill),
            errors: blank_errors(),
            submit_in_progress: false,
            submit_failed: false,
        }
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn has_error(&self, id: QuestionId) -> bool {
        self.errors.get(&id).copied().unwrap_or(false)
    }

    pub fn submit_in_progress(&self) -> bool {
        self.submit_in_progress
    }

    pub fn submit_enabled(&self) -> bool {
        !self.submit_in_progress
    }

    pub fn submit_failed(&self) -> bool {
        self.submit_failed
    }

    /// Hides and clears `id` and everything after it in base order, then
    /// shows `id` with an empty answer. `hide` is also hidden and cleared
    /// wherever it sits in the order.
    pub fn reveal_from(&mut self, id: QuestionId, hide: Option<QuestionId>) {
        for later in id.from_here() {
            self.status.set(later, QuestionState::hidden());
        }
        if let Some(hide) = hide {
            self.status.set(hide, QuestionState::hidden());
        }
        self.status.set(id, QuestionState::shown());
    }

    /// Records `value` for `id` and applies the branching rules.
    ///
    /// `None` stands for a cleared selection: `id` is revealed again with no
    /// answer and nothing downstream stays visible.
    pub fn answer(&mut self, id: QuestionId, value: Option<&str>) -> Option<Transition> {
        self.answer_with(id, value, successor(id))
    }

    /// Same as [`SurveyState::answer`] with an explicit branch target.
    pub fn answer_with(
        &mut self,
        id: QuestionId,
        value: Option<&str>,
        next: Next,
    ) -> Option<Transition> {
        let Some(value) = value else {
            self.reveal_from(id, None);
            return None;
        };

        self.errors.insert(id, false);
        self.status.set(id, QuestionState::answered(value));

        let transition = resolve(next, value, &self.status)?;
        self.reveal_from(transition.reveal, transition.hide);
        Some(transition)
    }

    /// Checked variant of [`SurveyState::answer`]: `id` must be visible and
    /// `value` one of its options in `spec`. State is untouched on error.
    pub fn select(
        &mut self,
        spec: &SurveySpec,
        id: QuestionId,
        value: Option<&str>,
    ) -> Result<Option<Transition>, SurveyError> {
        if !self.status.is_shown(id) {
            return Err(SurveyError::QuestionHidden(id));
        }
        if let Some(value) = value {
            let accepted = spec
                .question(id)
                .map(|question| question.accepts(value))
                .unwrap_or(false);
            if !accepted {
                return Err(SurveyError::InvalidOption {
                    question: id,
                    value: value.to_string(),
                });
            }
        }
        Ok(self.answer(id, value))
    }

    /// Starts a submit attempt. Submitting is disabled until the attempt is
    /// refused or [`SurveyState::finish_submit`] is called.
    pub fn begin_submit(&mut self) -> SubmitGate {
        if self.submit_in_progress {
            return SubmitGate::Busy;
        }
        self.submit_in_progress = true;

        self.errors = validation_errors(&self.status);
        let missing: Vec<_> = self
            .errors
            .iter()
            .filter(|(_, missing)| **missing)
            .map(|(id, _)| *id)
            .collect();

        if missing.is_empty() {
            SubmitGate::Ready(self.status.clone())
        } else {
            self.submit_in_progress = false;
            SubmitGate::Invalid(missing)
        }
    }

    /// Completes the attempt started by a `Ready` gate. Answers are kept
    /// either way; a failure raises the failure flag until a later success.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submit_in_progress = false;
        self.submit_failed = !succeeded;
    }
}

impl Default for SurveyState {
    fn default() -> Self {
        Self::new()
    }
}
