#![allow(missing_docs)]

pub mod error;
pub mod progress;
pub mod question;
pub mod record;
pub mod render;
pub mod spec;
pub mod state;
pub mod status;
pub mod transition;
pub mod validate;

pub use error::SurveyError;
pub use progress::{answered_count, next_question, visible_count};
pub use question::QuestionId;
pub use record::SubmissionRecord;
pub use render::{
    FAILURE_MESSAGE, RenderPayload, RenderProgress, RenderQuestion, RenderStatus,
    build_render_payload, render_json_ui, render_text,
};
pub use spec::{QuestionOption, QuestionSpec, SurveySpec};
pub use state::{SubmitGate, SurveyState};
pub use status::{ErrorMap, FormStatus, PartialStatus, QuestionState, partial_from_json};
pub use transition::{Decision, Next, Transition, decide, successor};
pub use validate::{ValidationResult, validate, validate_against, validation_errors};
