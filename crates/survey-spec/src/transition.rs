//! Branching rules of the screening sequence.
//!
//! Every question maps to a [`Next`]: either the end of the chain, a fixed
//! successor, or a decision over the value just given and earlier answers.
//! Branches only occur at `gender`, `fever` and `healthProfessional`.

use crate::question::QuestionId;
use crate::status::FormStatus;

/// Question to reveal next, plus an optional conditional question to retract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub reveal: QuestionId,
    pub hide: Option<QuestionId>,
}

impl Transition {
    pub fn to(reveal: QuestionId) -> Self {
        Self { reveal, hide: None }
    }

    pub fn hiding(self, hide: QuestionId) -> Self {
        Self {
            hide: Some(hide),
            ..self
        }
    }
}

/// Branch decision: receives the value just recorded and the status after
/// recording it.
pub type Decision = fn(&str, &FormStatus) -> Transition;

/// What follows a question once it has been answered.
#[derive(Debug, Clone, Copy)]
pub enum Next {
    Terminal,
    Reveal(QuestionId),
    Branch(Decision),
}

pub fn successor(id: QuestionId) -> Next {
    match id {
        QuestionId::Gender => Next::Branch(after_gender),
        QuestionId::Pregnant => Next::Reveal(QuestionId::Age),
        QuestionId::Age => Next::Reveal(QuestionId::Breath),
        QuestionId::Breath => Next::Reveal(QuestionId::Fever),
        QuestionId::Fever => Next::Branch(after_fever),
        QuestionId::AlarmSigns => Next::Reveal(QuestionId::RiskGroup),
        QuestionId::RiskGroup => Next::Reveal(QuestionId::HealthProfessional),
        QuestionId::HealthProfessional => Next::Branch(after_health_professional),
        QuestionId::ProfessionalExposure => Next::Reveal(QuestionId::FamilyExposure),
        QuestionId::FamilyExposure => Next::Terminal,
    }
}

/// Resolves the transition for answering `id` with `value`; `None` at the
/// terminal question.
pub fn decide(id: QuestionId, value: &str, status: &FormStatus) -> Option<Transition> {
    resolve(successor(id), value, status)
}

pub(crate) fn resolve(next: Next, value: &str, status: &FormStatus) -> Option<Transition> {
    match next {
        Next::Terminal => None,
        Next::Reveal(target) => Some(Transition::to(target)),
        Next::Branch(decision) => Some(decision(value, status)),
    }
}

fn after_gender(value: &str, _status: &FormStatus) -> Transition {
    if value == "female" {
        Transition::to(QuestionId::Pregnant)
    } else {
        Transition::to(QuestionId::Age).hiding(QuestionId::Pregnant)
    }
}

fn after_fever(value: &str, status: &FormStatus) -> Transition {
    if value == "yes" && status.answer(QuestionId::Breath) == "yes" {
        Transition::to(QuestionId::AlarmSigns)
    } else {
        Transition::to(QuestionId::RiskGroup).hiding(QuestionId::AlarmSigns)
    }
}

fn after_health_professional(value: &str, _status: &FormStatus) -> Transition {
    if value == "yes" {
        Transition::to(QuestionId::ProfessionalExposure)
    } else {
        Transition::to(QuestionId::FamilyExposure).hiding(QuestionId::ProfessionalExposure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{PartialStatus, QuestionState};

    fn with_breath(answer: &str) -> FormStatus {
        FormStatus::with_prefill(PartialStatus::from([(
            QuestionId::Breath,
            QuestionState::answered(answer),
        )]))
    }

    #[test]
    fn gender_female_reveals_pregnant() {
        let t = decide(QuestionId::Gender, "female", &FormStatus::new());
        assert_eq!(t, Some(Transition::to(QuestionId::Pregnant)));
    }

    #[test]
    fn gender_male_reveals_age_and_hides_pregnant() {
        let t = decide(QuestionId::Gender, "male", &FormStatus::new());
        assert_eq!(
            t,
            Some(Transition::to(QuestionId::Age).hiding(QuestionId::Pregnant))
        );
    }

    #[test]
    fn single_successor_rows() {
        let status = FormStatus::new();
        let rows = [
            (QuestionId::Pregnant, "yes", QuestionId::Age),
            (QuestionId::Pregnant, "no", QuestionId::Age),
            (QuestionId::Age, "40-65", QuestionId::Breath),
            (QuestionId::Breath, "no", QuestionId::Fever),
            (QuestionId::AlarmSigns, "yes", QuestionId::RiskGroup),
            (QuestionId::RiskGroup, "no", QuestionId::HealthProfessional),
            (
                QuestionId::ProfessionalExposure,
                "yes",
                QuestionId::FamilyExposure,
            ),
        ];
        for (from, value, to) in rows {
            assert_eq!(
                decide(from, value, &status),
                Some(Transition::to(to)),
                "{from} -> {to}"
            );
        }
    }

    #[test]
    fn fever_with_breath_symptoms_reveals_alarm_signs() {
        let t = decide(QuestionId::Fever, "yes", &with_breath("yes"));
        assert_eq!(t, Some(Transition::to(QuestionId::AlarmSigns)));
    }

    #[test]
    fn fever_otherwise_skips_alarm_signs() {
        let skip = Some(Transition::to(QuestionId::RiskGroup).hiding(QuestionId::AlarmSigns));
        assert_eq!(decide(QuestionId::Fever, "yes", &with_breath("no")), skip);
        assert_eq!(decide(QuestionId::Fever, "no", &with_breath("yes")), skip);
        assert_eq!(decide(QuestionId::Fever, "no", &with_breath("no")), skip);
    }

    #[test]
    fn health_professional_branches() {
        let status = FormStatus::new();
        assert_eq!(
            decide(QuestionId::HealthProfessional, "yes", &status),
            Some(Transition::to(QuestionId::ProfessionalExposure))
        );
        assert_eq!(
            decide(QuestionId::HealthProfessional, "no", &status),
            Some(Transition::to(QuestionId::FamilyExposure).hiding(QuestionId::ProfessionalExposure))
        );
    }

    #[test]
    fn family_exposure_is_the_only_terminal() {
        for id in QuestionId::SEQUENCE {
            let terminal = matches!(successor(id), Next::Terminal);
            assert_eq!(terminal, id == QuestionId::FamilyExposure, "{id}");
        }
    }

    #[test]
    fn every_transition_moves_forward() {
        let status = with_breath("yes");
        for id in QuestionId::SEQUENCE {
            for value in ["yes", "no", "male", "female"] {
                if let Some(t) = decide(id, value, &status) {
                    assert!(t.reveal > id);
                    if let Some(hide) = t.hide {
                        assert!(hide > id);
                    }
                }
            }
        }
    }
}
