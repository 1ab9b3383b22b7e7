//! Questionnaire session: the per-user state machine.
//!
//! Welcome → ExperienceInput → EvidenceInput → Report, with reset back to Welcome
//! from anywhere. Every transition is a named action on an explicit `Session`
//! value; remote collaborators are passed in, never looked up globally.

pub mod handlers;
pub mod store;

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::mapping::{run_mapping, MappingRun};
use crate::assessment::parser::{parse_experience_analysis, ParseError};
use crate::assessment::prompts::build_experience_prompt;
use crate::catalog::CompetencyCatalog;
use crate::llm_client::{Assessor, CallError};
use crate::models::assessment::{MappingResults, UnitRelevance};
use crate::models::evidence::{EvidenceKind, EvidenceSnippets};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Welcome,
    ExperienceInput,
    /// Experience analysed; collecting evidence snippets.
    EvidenceInput,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::ExperienceInput => "experience_input",
            Stage::EvidenceInput => "evidence_input",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    #[error("cannot {action} while in the {from} stage")]
    InvalidTransition { from: Stage, action: &'static str },

    #[error("experience analysis call failed: {0}")]
    Call(#[from] CallError),

    #[error("experience analysis response was not valid JSON: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    stage: Stage,
    experience_text: String,
    evidence: EvidenceSnippets,
    relevant_units_assessment: Vec<UnitRelevance>,
    mapping_results: Option<MappingResults>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn experience_text(&self) -> &str {
        &self.experience_text
    }

    pub fn evidence(&self) -> &EvidenceSnippets {
        &self.evidence
    }

    pub fn relevant_units_assessment(&self) -> &[UnitRelevance] {
        &self.relevant_units_assessment
    }

    pub fn mapping_results(&self) -> Option<&MappingResults> {
        self.mapping_results.as_ref()
    }

    /// True once the experience analysis has succeeded in this session.
    pub fn analysis_done(&self) -> bool {
        matches!(self.stage, Stage::EvidenceInput | Stage::Report)
    }

    fn require(&self, allowed: &[Stage], action: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.stage,
                action,
            })
        }
    }

    /// Welcome → ExperienceInput.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require(&[Stage::Welcome], "start")?;
        self.stage = Stage::ExperienceInput;
        Ok(())
    }

    /// Analyses the experience text and moves to EvidenceInput.
    ///
    /// Can be repeated from EvidenceInput to refine the analysis. Blank text, a failed
    /// call, or an undecodable response leave the session untouched.
    pub async fn submit_experience(
        &mut self,
        experience_text: &str,
        catalog: &CompetencyCatalog,
        assessor: &dyn Assessor,
    ) -> Result<(), SessionError> {
        self.require(
            &[Stage::ExperienceInput, Stage::EvidenceInput],
            "submit experience",
        )?;

        if experience_text.trim().is_empty() {
            return Err(SessionError::EmptyInput("experience summary"));
        }

        let prompt = build_experience_prompt(experience_text, catalog);
        let raw = assessor.call(&prompt).await.map_err(|e| {
            warn!("Experience analysis call failed: {e}");
            SessionError::Call(e)
        })?;
        let assessment = parse_experience_analysis(&raw).map_err(|e| {
            warn!("Experience analysis response rejected: {e}");
            SessionError::Parse(e)
        })?;

        info!(
            "Experience analysed: {} relevant unit(s) identified",
            assessment.len()
        );

        self.experience_text = experience_text.to_string();
        self.relevant_units_assessment = assessment;
        self.stage = Stage::EvidenceInput;
        Ok(())
    }

    /// Replaces one evidence snippet. Never changes stage.
    pub fn set_evidence(
        &mut self,
        kind: EvidenceKind,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require(&[Stage::EvidenceInput], "edit evidence")?;
        self.evidence.set(kind, content);
        Ok(())
    }

    /// Runs the full mapping pass and moves to Report.
    pub async fn build_mapping(
        &mut self,
        catalog: &CompetencyCatalog,
        assessor: &dyn Assessor,
    ) -> Result<MappingRun, SessionError> {
        self.require(&[Stage::EvidenceInput], "build the mapping")?;

        let run = run_mapping(&self.evidence, catalog, assessor).await;
        info!(
            "Mapping stored: {} criterion result(s) across {} unit(s)",
            run.results.leaf_count(),
            run.results.units.len()
        );
        self.mapping_results = Some(run.results.clone());
        self.stage = Stage::Report;
        Ok(run)
    }

    /// Start over: every field returns to its initial value.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedAssessor;
    use crate::models::assessment::Relevance;

    const ANALYSIS: &str = r#"{"relevant_units_assessment": [
        {"unit": "TAEDEL411 Facilitate vocational training", "relevance": "Strongly Relevant",
         "suggestions": ["Training plans", "Participant feedback"]},
        {"unit": "TAEASS412 Assess competence", "relevance": "Moderately Relevant",
         "suggestions": ["Assessment tools"]}
    ]}"#;

    const MAPPING: &str =
        r#"{"confidence": "Medium", "explanation": "Partial.", "suggested_action": "Add detail."}"#;

    const EXPERIENCE: &str =
        "I have delivered workplace training to new employees for the last 3 years.";

    /// Answers the experience prompt with `ANALYSIS` and every mapping prompt with `MAPPING`.
    fn assessor() -> ScriptedAssessor {
        ScriptedAssessor::new(|_, prompt| {
            if prompt.contains("relevant_units_assessment") {
                Ok(ANALYSIS.to_string())
            } else {
                Ok(MAPPING.to_string())
            }
        })
    }

    async fn session_in_evidence_input(catalog: &CompetencyCatalog) -> Session {
        let mut session = Session::new();
        session.start().unwrap();
        session
            .submit_experience(EXPERIENCE, catalog, &assessor())
            .await
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_initial_values() {
        let session = Session::new();
        assert_eq!(session.stage(), Stage::Welcome);
        assert_eq!(session.experience_text(), "");
        assert_eq!(session.evidence().iter().count(), 7);
        assert!(session.relevant_units_assessment().is_empty());
        assert!(session.mapping_results().is_none());
        assert!(!session.analysis_done());
    }

    #[test]
    fn test_start_moves_to_experience_input() {
        let mut session = Session::new();
        session.start().unwrap();
        assert_eq!(session.stage(), Stage::ExperienceInput);
        assert!(matches!(
            session.start(),
            Err(SessionError::InvalidTransition { from: Stage::ExperienceInput, .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_experience_success() {
        let catalog = CompetencyCatalog::tae40122();
        let session = session_in_evidence_input(&catalog).await;

        assert_eq!(session.stage(), Stage::EvidenceInput);
        assert!(session.analysis_done());
        assert_eq!(session.experience_text(), EXPERIENCE);
        assert_eq!(session.relevant_units_assessment().len(), 2);
        assert_eq!(
            session.relevant_units_assessment()[0].relevance,
            Relevance::StronglyRelevant
        );
    }

    #[tokio::test]
    async fn test_submit_blank_experience_is_rejected_without_call() {
        let catalog = CompetencyCatalog::tae40122();
        let assessor = assessor();
        let mut session = Session::new();
        session.start().unwrap();
        let before = session.clone();

        let err = session
            .submit_experience("   \n", &catalog, &assessor)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::EmptyInput(_)));
        assert_eq!(assessor.calls(), 0);
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn test_submit_experience_call_failure_leaves_session_unchanged() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = Session::new();
        session.start().unwrap();
        let before = session.clone();

        let err = session
            .submit_experience(EXPERIENCE, &catalog, &ScriptedAssessor::failing())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Call(_)));
        assert_eq!(session, before);
        assert!(!session.analysis_done());
    }

    #[tokio::test]
    async fn test_submit_experience_parse_failure_leaves_session_unchanged() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = Session::new();
        session.start().unwrap();
        let before = session.clone();

        let err = session
            .submit_experience(EXPERIENCE, &catalog, &ScriptedAssessor::always("I think so"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Parse(_)));
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn test_submit_experience_with_empty_assessment_still_advances() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = Session::new();
        session.start().unwrap();

        session
            .submit_experience(EXPERIENCE, &catalog, &ScriptedAssessor::always("{}"))
            .await
            .unwrap();

        assert_eq!(session.stage(), Stage::EvidenceInput);
        assert!(session.relevant_units_assessment().is_empty());
    }

    #[tokio::test]
    async fn test_submit_experience_before_start_is_invalid() {
        let catalog = CompetencyCatalog::tae40122();
        let assessor = assessor();
        let mut session = Session::new();

        let err = session
            .submit_experience(EXPERIENCE, &catalog, &assessor)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidTransition { from: Stage::Welcome, .. }));
        assert_eq!(assessor.calls(), 0);
    }

    #[tokio::test]
    async fn test_set_evidence_never_changes_stage() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = session_in_evidence_input(&catalog).await;

        for kind in EvidenceKind::ALL {
            session.set_evidence(kind, format!("{kind} content")).unwrap();
            assert_eq!(session.stage(), Stage::EvidenceInput);
        }
        assert_eq!(session.evidence().iter().count(), 7);
        assert!(session
            .evidence()
            .iter()
            .any(|(k, v)| k == EvidenceKind::AssessmentTool && v == "assessment_tool content"));
    }

    #[test]
    fn test_set_evidence_outside_evidence_stage_is_invalid() {
        let mut session = Session::new();
        assert!(session
            .set_evidence(EvidenceKind::TrainingPlan, "plan")
            .is_err());
        assert!(session.evidence().iter().all(|(_, v)| v.is_empty()));
    }

    #[tokio::test]
    async fn test_build_mapping_with_blank_evidence_goes_straight_to_report() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = session_in_evidence_input(&catalog).await;
        let assessor = assessor();

        let run = session.build_mapping(&catalog, &assessor).await.unwrap();

        assert_eq!(assessor.calls(), 0);
        assert_eq!(run.calls_made, 0);
        assert_eq!(session.stage(), Stage::Report);
        assert_eq!(session.mapping_results().unwrap().leaf_count(), 0);
    }

    #[tokio::test]
    async fn test_build_mapping_populates_results() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = session_in_evidence_input(&catalog).await;
        session
            .set_evidence(EvidenceKind::DescTrainingSession, "Ran a 3-hour induction.")
            .unwrap();
        let assessor = assessor();

        let run = session.build_mapping(&catalog, &assessor).await.unwrap();

        assert_eq!(assessor.calls(), 18);
        assert_eq!(run.calls_made, 18);
        assert_eq!(session.stage(), Stage::Report);
        assert_eq!(session.mapping_results().unwrap().leaf_count(), 18);
    }

    #[tokio::test]
    async fn test_reset_from_report_restores_initial_values() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = session_in_evidence_input(&catalog).await;
        session
            .set_evidence(EvidenceKind::TrainingPlan, "Plan")
            .unwrap();
        session.build_mapping(&catalog, &assessor()).await.unwrap();
        assert_eq!(session.stage(), Stage::Report);

        session.reset();

        assert_eq!(session, Session::new());
        assert_eq!(session.stage(), Stage::Welcome);
        assert_eq!(session.experience_text(), "");
        assert!(session.evidence().iter().all(|(_, v)| v.is_empty()));
        assert_eq!(session.evidence().iter().count(), 7);
        assert!(session.relevant_units_assessment().is_empty());
        assert!(session.mapping_results().is_none());
    }

    #[tokio::test]
    async fn test_build_mapping_twice_is_invalid() {
        let catalog = CompetencyCatalog::tae40122();
        let mut session = session_in_evidence_input(&catalog).await;
        session.build_mapping(&catalog, &assessor()).await.unwrap();

        let err = session
            .build_mapping(&catalog, &assessor())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { from: Stage::Report, .. }));
    }
}
