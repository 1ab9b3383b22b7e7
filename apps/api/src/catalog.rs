//! Competency catalog: the fixed TAE40122 core units and their performance criteria.
//!
//! Built once at startup and shared read-only by every session.

use serde::Serialize;

/// (key, description) pairs in the order they appear in the unit.
type CriteriaTable = &'static [(&'static str, &'static str)];

const TAEDEL411_CRITERIA: CriteriaTable = &[
    ("1.1", "Identify purpose, target group, learning resources, and organisational requirements for vocational training."),
    ("1.3", "Arrange and review delivery plan, session plans and learning resources for suitability."),
    ("1.4", "Identify and organise support for individuals requiring assistance with foundation skills and other support needs."),
    ("2.2", "Customise session plans and learning resources to meet diverse learner needs and contexts."),
    ("3.2", "Facilitate face-to-face vocational training sessions using a range of methods and activities."),
    ("3.3", "Use training facilitation techniques and activities to engage learners."),
    ("3.4", "Present information clearly to individuals and groups."),
    ("4.1", "Monitor and document individual and group learner progress."),
    ("4.3", "Adapt session plans and adjust training techniques to respond to learner needs and group dynamics."),
    ("5.1", "Seek and respond to feedback from learners, supervisors and colleagues relevant to own training practice."),
    ("5.2", "Identify opportunities for improvement in own vocational training practice and adapt accordingly."),
];

const TAEASS412_CRITERIA: CriteriaTable = &[
    ("1.3", "Access and analyse the relevant unit/s of competency and associated assessment tool/s."),
    ("2.1", "Identify where recognition of prior learning (RPL) and/or reasonable adjustment is required."),
    ("3.1", "Explain to candidates the assessment process and any required reasonable adjustments."),
    ("4.2", "Use agreed assessment methods and instruments to collect valid, sufficient, authentic and current evidence."),
    ("5.1", "Make assessment judgements against evidence and record outcomes."),
    ("6.1", "Seek feedback relevant to own assessment practice."),
    ("6.2", "Analyse assessment and own practice for continuous improvement."),
];

/// (identifier, description, criteria)
const TAE40122_UNITS: &[(&str, &str, CriteriaTable)] = &[
    (
        "TAEDEL411 Facilitate vocational training",
        "This unit describes the skills and knowledge required to plan, organise and facilitate vocational training sessions, including customising and delivering learning content and supporting learners.",
        TAEDEL411_CRITERIA,
    ),
    (
        "TAEASS412 Assess competence",
        "This unit describes the skills and knowledge required to assess the competence of a candidate.",
        TAEASS412_CRITERIA,
    ),
];

/// Units the assistant analyses and maps evidence against.
pub const TARGET_UNITS: &[&str] = &[
    "TAEDEL411 Facilitate vocational training",
    "TAEASS412 Assess competence",
];

pub const QUALIFICATION: &str = "TAE40122 Certificate IV in Training and Assessment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceCriterion {
    pub key: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub id: String,
    pub description: String,
    pub criteria: Vec<PerformanceCriterion>,
}

impl Unit {
    /// The unit code, e.g. `TAEDEL411`.
    pub fn code(&self) -> &str {
        self.id.split_whitespace().next().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetencyCatalog {
    pub qualification: String,
    units: Vec<Unit>,
    targets: Vec<String>,
}

impl CompetencyCatalog {
    /// The built-in TAE40122 core-unit table.
    pub fn tae40122() -> Self {
        let units = TAE40122_UNITS
            .iter()
            .map(|(id, description, criteria)| Unit {
                id: id.to_string(),
                description: description.to_string(),
                criteria: criteria
                    .iter()
                    .map(|(key, description)| PerformanceCriterion {
                        key: key.to_string(),
                        description: description.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            qualification: QUALIFICATION.to_string(),
            units,
            targets: TARGET_UNITS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Target units in catalog order. Targets without a catalog entry are skipped.
    pub fn target_units(&self) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| self.targets.contains(&u.id))
            .collect()
    }

    /// Total number of criteria across the target units.
    pub fn target_criteria_count(&self) -> usize {
        self.target_units().iter().map(|u| u.criteria.len()).sum()
    }
}
