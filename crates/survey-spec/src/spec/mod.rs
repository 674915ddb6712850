pub mod form;
pub mod question;

pub use form::SurveySpec;
pub use question::{AGE_BANDS, QuestionOption, QuestionSpec};
