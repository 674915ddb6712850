use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SurveyError;

/// Identifier of a survey question.
///
/// Variant order is the base traversal order used when no branch applies, so
/// the derived `Ord` doubles as "comes before" in the sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum QuestionId {
    Gender,
    Pregnant,
    Age,
    Breath,
    Fever,
    AlarmSigns,
    RiskGroup,
    HealthProfessional,
    ProfessionalExposure,
    FamilyExposure,
}

impl QuestionId {
    /// Base ordering of every question.
    pub const SEQUENCE: [QuestionId; 10] = [
        QuestionId::Gender,
        QuestionId::Pregnant,
        QuestionId::Age,
        QuestionId::Breath,
        QuestionId::Fever,
        QuestionId::AlarmSigns,
        QuestionId::RiskGroup,
        QuestionId::HealthProfessional,
        QuestionId::ProfessionalExposure,
        QuestionId::FamilyExposure,
    ];

    /// Question shown when a session starts.
    pub const FIRST: QuestionId = QuestionId::Gender;

    /// Position in the base ordering.
    pub fn index(self) -> usize {
        self as usize
    }

    /// This question followed by every question after it in base order.
    pub fn from_here(self) -> impl Iterator<Item = QuestionId> {
        Self::SEQUENCE.into_iter().skip(self.index())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionId::Gender => "gender",
            QuestionId::Pregnant => "pregnant",
            QuestionId::Age => "age",
            QuestionId::Breath => "breath",
            QuestionId::Fever => "fever",
            QuestionId::AlarmSigns => "alarmSigns",
            QuestionId::RiskGroup => "riskGroup",
            QuestionId::HealthProfessional => "healthProfessional",
            QuestionId::ProfessionalExposure => "professionalExposure",
            QuestionId::FamilyExposure => "familyExposure",
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionId {
    type Err = SurveyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .iter()
            .copied()
            .find(|id| id.as_str() == raw)
            .ok_or_else(|| SurveyError::UnknownQuestion(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_matches_variant_order() {
        for (position, id) in QuestionId::SEQUENCE.iter().enumerate() {
            assert_eq!(id.index(), position);
        }
        assert!(QuestionId::Gender < QuestionId::FamilyExposure);
    }

    #[test]
    fn names_round_trip_through_serde_and_from_str() {
        for id in QuestionId::SEQUENCE {
            let encoded = serde_json::to_value(id).expect("encode");
            assert_eq!(encoded, id.as_str());
            assert_eq!(id.as_str().parse::<QuestionId>().expect("parse"), id);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "temperature".parse::<QuestionId>().unwrap_err();
        assert!(matches!(err, SurveyError::UnknownQuestion(name) if name == "temperature"));
    }

    #[test]
    fn from_here_yields_suffix() {
        let tail: Vec<_> = QuestionId::HealthProfessional.from_here().collect();
        assert_eq!(
            tail,
            vec![
                QuestionId::HealthProfessional,
                QuestionId::ProfessionalExposure,
                QuestionId::FamilyExposure
            ]
        );
    }
}
