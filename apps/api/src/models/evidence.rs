use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of evidence types a candidate can describe.
/// Declaration order is the display and corpus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    TrainingPlan,
    ParticipantFeedback,
    LearningResources,
    AssessmentTool,
    AssessmentRecords,
    DescTrainingSession,
    DescAssessmentProcess,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 7] = [
        EvidenceKind::TrainingPlan,
        EvidenceKind::ParticipantFeedback,
        EvidenceKind::LearningResources,
        EvidenceKind::AssessmentTool,
        EvidenceKind::AssessmentRecords,
        EvidenceKind::DescTrainingSession,
        EvidenceKind::DescAssessmentProcess,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EvidenceKind::TrainingPlan => "training_plan",
            EvidenceKind::ParticipantFeedback => "participant_feedback",
            EvidenceKind::LearningResources => "learning_resources",
            EvidenceKind::AssessmentTool => "assessment_tool",
            EvidenceKind::AssessmentRecords => "assessment_records",
            EvidenceKind::DescTrainingSession => "desc_training_session",
            EvidenceKind::DescAssessmentProcess => "desc_assessment_process",
        }
    }

    /// Form label shown next to the input for this evidence type.
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceKind::TrainingPlan => "Training Plan / Session Outline Snippet",
            EvidenceKind::ParticipantFeedback => "Participant Feedback / Evaluations Snippet",
            EvidenceKind::LearningResources => {
                "Learning Resources (e.g., presentations, handouts) Snippet"
            }
            EvidenceKind::AssessmentTool => "Assessment Tool / Checklist Snippet",
            EvidenceKind::AssessmentRecords => "Records of Assessment Decisions / Feedback Snippet",
            EvidenceKind::DescTrainingSession => {
                "Description of a Training Session You Facilitated Snippet"
            }
            EvidenceKind::DescAssessmentProcess => {
                "Description of an Assessment Process You Conducted Snippet"
            }
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown evidence type '{0}'")]
pub struct UnknownEvidenceKind(pub String);

impl FromStr for EvidenceKind {
    type Err = UnknownEvidenceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EvidenceKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| UnknownEvidenceKind(s.to_string()))
    }
}

/// Evidence text per kind. Every kind is always present; the default is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvidenceSnippets(BTreeMap<EvidenceKind, String>);

impl Default for EvidenceSnippets {
    fn default() -> Self {
        Self(
            EvidenceKind::ALL
                .into_iter()
                .map(|k| (k, String::new()))
                .collect(),
        )
    }
}

impl EvidenceSnippets {
    pub fn set(&mut self, kind: EvidenceKind, content: impl Into<String>) {
        self.0.insert(kind, content.into());
    }

    /// All (kind, content) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EvidenceKind, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
