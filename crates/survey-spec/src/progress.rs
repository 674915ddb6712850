use crate::question::QuestionId;
use crate::status::FormStatus;

/// First visible question, in base order, still waiting for an answer.
pub fn next_question(status: &FormStatus) -> Option<QuestionId> {
    status
        .iter()
        .find(|(_, state)| state.is_pending())
        .map(|(id, _)| id)
}

pub fn visible_count(status: &FormStatus) -> usize {
    status.visible().count()
}

pub fn answered_count(status: &FormStatus) -> usize {
    status
        .iter()
        .filter(|(_, state)| state.show && state.is_answered())
        .count()
}
