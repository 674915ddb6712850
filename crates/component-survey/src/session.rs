use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tracing::{debug, info, warn};

use survey_spec::{
    FormStatus, PartialStatus, QuestionId, RenderPayload, SubmissionRecord, SubmitGate,
    SurveySpec, SurveyState, Transition, build_render_payload,
};

use crate::collaborators::{FormStateSink, Navigator, OuterState, ReportStore};
use crate::error::ComponentError;

/// Route navigated to after a report is stored.
pub const SUCCESS_ROUTE: &str = "/success";

/// Result of one submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submit is still waiting on the store; nothing was sent.
    Busy,
    /// Visible questions were unanswered; nothing was sent.
    Invalid(Vec<QuestionId>),
    /// The report was stored and the user was sent to the success route.
    Submitted(SubmissionRecord),
    /// The store failed. Answers are kept and submit is enabled again.
    Failed(String),
}

/// Union of `outer` and the question states; question entries win.
pub fn merge_form_state(outer: &OuterState, status: &FormStatus) -> OuterState {
    let mut merged = outer.clone();
    for (id, state) in status.iter() {
        merged.insert(
            id.as_str().to_string(),
            json!({ "show": state.show, "answer": state.answer }),
        );
    }
    merged
}

/// One form session. The survey state is only locked between awaits, so a
/// second submit issued while the store is still writing sees the in-flight
/// flag and is turned away.
pub struct SurveySession<S, N, F> {
    spec: SurveySpec,
    state: Mutex<SurveyState>,
    outer_state: Mutex<OuterState>,
    success_route: String,
    store: S,
    navigator: N,
    form_state: F,
}

impl<S, N, F> SurveySession<S, N, F>
where
    S: ReportStore,
    N: Navigator,
    F: FormStateSink,
{
    pub fn new(store: S, navigator: N, form_state: F) -> Self {
        Self {
            spec: SurveySpec::self_report(),
            state: Mutex::new(SurveyState::new()),
            outer_state: Mutex::new(OuterState::new()),
            success_route: SUCCESS_ROUTE.to_string(),
            store,
            navigator,
            form_state,
        }
    }

    /// Resumes from previously captured question states.
    pub fn with_prefill(self, prefill: PartialStatus) -> Self {
        Self {
            state: Mutex::new(SurveyState::with_prefill(prefill)),
            ..self
        }
    }

    pub fn with_outer_state(self, outer: OuterState) -> Self {
        Self {
            outer_state: Mutex::new(outer),
            ..self
        }
    }

    pub fn with_success_route(self, route: impl Into<String>) -> Self {
        Self {
            success_route: route.into(),
            ..self
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn form_state_sink(&self) -> &F {
        &self.form_state
    }

    /// Snapshot of the current survey state.
    pub fn state(&self) -> SurveyState {
        self.lock_state().clone()
    }

    pub fn outer_state(&self) -> OuterState {
        self.outer_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn render(&self) -> RenderPayload {
        build_render_payload(&self.spec, &self.lock_state())
    }

    /// Applies an option choice; `None` clears the selection.
    pub fn select(
        &self,
        id: QuestionId,
        value: Option<&str>,
    ) -> Result<Option<Transition>, ComponentError> {
        let transition = self.lock_state().select(&self.spec, id, value)?;
        match &transition {
            Some(t) => debug!(question = %id, ?value, reveal = %t.reveal, hide = ?t.hide, "answered"),
            None => debug!(question = %id, ?value, "answered without successor"),
        }
        Ok(transition)
    }

    /// Validates, stores the report once, then hands the answers to the outer
    /// form and navigates to the success route.
    pub async fn submit(&self) -> SubmitOutcome {
        let gate = self.lock_state().begin_submit();
        let snapshot = match gate {
            SubmitGate::Busy => {
                debug!("submit ignored while another is in flight");
                return SubmitOutcome::Busy;
            }
            SubmitGate::Invalid(missing) => {
                warn!(?missing, "submit refused: unanswered questions");
                return SubmitOutcome::Invalid(missing);
            }
            SubmitGate::Ready(snapshot) => snapshot,
        };

        let in_flight = InFlight::new(&self.state);
        let record = SubmissionRecord::new(snapshot.clone(), self.store.now());
        info!(report_date = %record.report_date, "submitting report");

        match self.store.append(record.clone()).await {
            Ok(()) => {
                in_flight.disarm();
                let merged = {
                    let mut outer = self
                        .outer_state
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    let merged = merge_form_state(&outer, &snapshot);
                    *outer = merged.clone();
                    merged
                };
                self.form_state.set_form_state(merged);
                self.lock_state().finish_submit(true);
                info!(route = %self.success_route, "report stored");
                self.navigator.go_to(&self.success_route);
                SubmitOutcome::Submitted(record)
            }
            Err(err) => {
                in_flight.disarm();
                self.lock_state().finish_submit(false);
                warn!(error = %err, "report store failed");
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SurveyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the in-flight flag of an accepted submit. Dropping it while still
/// armed, e.g. when the submit future is cancelled mid-write, ends the attempt
/// as failed so the user can submit again.
struct InFlight<'a> {
    state: &'a Mutex<SurveyState>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<SurveyState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("submit abandoned before the store answered");
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .finish_submit(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockFormStateSink, MockNavigator, MockReportStore};
    use crate::error::StoreError;
    use chrono::{TimeZone, Utc};

    const MALE_PATH: [(QuestionId, &str); 7] = [
        (QuestionId::Gender, "male"),
        (QuestionId::Age, "18-40"),
        (QuestionId::Breath, "no"),
        (QuestionId::Fever, "no"),
        (QuestionId::RiskGroup, "no"),
        (QuestionId::HealthProfessional, "no"),
        (QuestionId::FamilyExposure, "no"),
    ];

    fn fill<S: ReportStore, N: Navigator, F: FormStateSink>(session: &SurveySession<S, N, F>) {
        for (id, value) in MALE_PATH {
            session.select(id, Some(value)).expect("select");
        }
    }

    #[tokio::test]
    async fn successful_submit_appends_once_merges_and_navigates() {
        let at = Utc.with_ymd_and_hms(2020, 4, 1, 9, 30, 0).unwrap();
        let mut store = MockReportStore::new();
        store.expect_now().return_const(at);
        store
            .expect_append()
            .withf(move |record| {
                record.report_date == at
                    && record.answers.visible().count() == 7
                    && record.answers.answer(QuestionId::Pregnant).is_empty()
                    && !record.answers.is_shown(QuestionId::AlarmSigns)
                    && !record.answers.is_shown(QuestionId::ProfessionalExposure)
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut navigator = MockNavigator::new();
        navigator
            .expect_go_to()
            .withf(|route| route.to_string() == SUCCESS_ROUTE)
            .times(1)
            .return_const(());

        let mut sink = MockFormStateSink::new();
        sink.expect_set_form_state()
            .withf(|merged| merged["step"] == "symptoms" && merged["gender"]["answer"] == "male")
            .times(1)
            .return_const(());

        let mut outer = OuterState::new();
        outer.insert("step".into(), json!("symptoms"));
        let session = SurveySession::new(store, navigator, sink).with_outer_state(outer);
        fill(&session);

        assert!(matches!(session.submit().await, SubmitOutcome::Submitted(_)));
        let state = session.state();
        assert!(state.submit_enabled());
        assert!(!state.submit_failed());
        assert_eq!(session.outer_state()["age"]["answer"], "18-40");
    }

    #[tokio::test]
    async fn invalid_submit_never_touches_collaborators() {
        let mut store = MockReportStore::new();
        store.expect_now().never();
        store.expect_append().never();
        let mut navigator = MockNavigator::new();
        navigator.expect_go_to().never();
        let mut sink = MockFormStateSink::new();
        sink.expect_set_form_state().never();

        let session = SurveySession::new(store, navigator, sink);
        let outcome = session.submit().await;

        assert_eq!(outcome, SubmitOutcome::Invalid(vec![QuestionId::Gender]));
        let state = session.state();
        assert!(state.has_error(QuestionId::Gender));
        assert!(state.submit_enabled());
    }

    #[tokio::test]
    async fn store_failure_keeps_answers_and_allows_retry() {
        let mut store = MockReportStore::new();
        store.expect_now().returning(Utc::now);
        let mut calls = 0;
        store.expect_append().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(StoreError::Rejected("unavailable".into()))
            } else {
                Ok(())
            }
        });
        let mut navigator = MockNavigator::new();
        navigator.expect_go_to().times(1).return_const(());
        let mut sink = MockFormStateSink::new();
        sink.expect_set_form_state().times(1).return_const(());

        let session = SurveySession::new(store, navigator, sink);
        fill(&session);

        let outcome = session.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(message) if message.contains("unavailable")));
        let state = session.state();
        assert!(state.submit_failed());
        assert!(state.submit_enabled());
        assert_eq!(state.status().answer(QuestionId::FamilyExposure), "no");

        assert!(matches!(session.submit().await, SubmitOutcome::Submitted(_)));
        assert!(!session.state().submit_failed());
    }

    #[test]
    fn select_surfaces_survey_errors() {
        let session = SurveySession::new(
            MockReportStore::new(),
            MockNavigator::new(),
            MockFormStateSink::new(),
        );
        let err = session
            .select(QuestionId::Age, Some("18-40"))
            .unwrap_err();
        assert!(matches!(
            err,
            ComponentError::Survey(survey_spec::SurveyError::QuestionHidden(QuestionId::Age))
        ));
    }

    #[test]
    fn merge_overwrites_question_keys_only() {
        let mut outer = OuterState::new();
        outer.insert("gender".into(), json!("stale"));
        outer.insert("province".into(), json!("Córdoba"));

        let merged = merge_form_state(&outer, &FormStatus::new());
        assert_eq!(merged["province"], "Córdoba");
        assert_eq!(merged["gender"], json!({ "show": true, "answer": "" }));
        assert_eq!(merged.len(), 11);
    }
}
