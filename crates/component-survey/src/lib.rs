//! Hosts one survey session: forwards option selections to the sequencing
//! state machine and drives the asynchronous submit against the report
//! store, navigation and outer form state.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use collaborators::{FormStateSink, Navigator, OuterState, ReportStore};
pub use config::ComponentConfig;
pub use error::{ComponentError, StoreError};
pub use session::{SUCCESS_ROUTE, SubmitOutcome, SurveySession, merge_form_state};
pub use store::{DEFAULT_COLLECTION, JsonlStore, MemoryStore};
