use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::question::QuestionId;
use crate::spec::question::{AGE_BANDS, QuestionOption, QuestionSpec};

/// Survey definition: metadata plus one [`QuestionSpec`] per question, in
/// base order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    pub id: String,
    pub title: String,
    pub version: String,
    pub questions: Vec<QuestionSpec>,
}

impl SurveySpec {
    /// The COVID-19 self-screening questionnaire.
    pub fn self_report() -> Self {
        let questions = vec![
            QuestionSpec {
                id: QuestionId::Gender,
                title: "¿Cuál es su sexo?".into(),
                subtitle: None,
                options: vec![
                    QuestionOption::new("male", "Hombre"),
                    QuestionOption::new("female", "Mujer"),
                ],
            },
            QuestionSpec::yes_no(QuestionId::Pregnant, "¿Estás embarazada?"),
            QuestionSpec {
                id: QuestionId::Age,
                title: "¿Cuál es tu rango de edad?".into(),
                subtitle: None,
                options: AGE_BANDS
                    .iter()
                    .map(|band| QuestionOption::new(*band, format!("{} años", band)))
                    .collect(),
            },
            QuestionSpec::yes_no(
                QuestionId::Breath,
                "¿Tenés síntomas respiratorios como tos o dolor de garganta?",
            )
            .with_subtitle("Si solo te chorrea la nariz, indicá NO."),
            QuestionSpec::yes_no(
                QuestionId::Fever,
                "En las últimas 24 horas, ¿Tuviste fiebre de 38°C o más?",
            ),
            QuestionSpec::yes_no(QuestionId::AlarmSigns, "¿Tenés alguno de estos signos?")
                .with_subtitle(
                    "Grave dificultad respiratoria, sensación de ahogo, dolor de pecho, fiebre \
                     persistente mas de 72 horas, confusión o somnolencia, dolor de cabeza \
                     intenso, visión borrosa.",
                ),
            QuestionSpec::yes_no(QuestionId::RiskGroup, "¿Pertenecés a un grupo de riesgo?")
                .with_subtitle(
                    "Mayores de 65 años, diabetes, hipertensión, obesidad mórbida, cáncer, \
                     diálisis, asma, problemas pulmonares crónicos, problemas del corazón, uso \
                     prolongado de corticoides.",
                ),
            QuestionSpec::yes_no(
                QuestionId::HealthProfessional,
                "¿Sos un profesional de la salud y tenés contacto con pacientes o residentes de \
                 asilos?",
            ),
            QuestionSpec::yes_no(
                QuestionId::ProfessionalExposure,
                "En el curso de tu trabajo sin equipo de protección, ¿tuviste contacto directo \
                 con uno en el caso confirmado?",
            ),
            QuestionSpec::yes_no(
                QuestionId::FamilyExposure,
                "En los últimos 15 días, ¿tuviste contacto con un algún caso confirmado en su \
                 entorno cercano (familia o personas del mismo hogar)?",
            ),
        ];

        Self {
            id: "self-report".into(),
            title: "Autodiagnóstico COVID-19".into(),
            version: "1.0.0".into(),
            questions,
        }
    }

    pub fn question(&self, id: QuestionId) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }
}

impl Default for SurveySpec {
    fn default() -> Self {
        Self::self_report()
    }
}
