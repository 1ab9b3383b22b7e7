//! Evidence mapping: assesses the combined evidence against every target criterion.
//!
//! Flow: build corpus → (blank? stop) → for each target unit, for each criterion
//!       in catalog order: build prompt → call → parse → record.
//!
//! No single call or parse failure aborts the pass. A failed call yields
//! `MappingResult::call_fallback()`, an undecodable answer yields
//! `MappingResult::parse_fallback()`, and each substitution is reported as a notice.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assessment::parser::parse_mapping_result;
use crate::assessment::prompts::build_mapping_prompt;
use crate::catalog::CompetencyCatalog;
use crate::llm_client::Assessor;
use crate::models::assessment::{
    CriterionMapping, MappingResult, MappingResults, MappingSource, UnitMapping,
};
use crate::models::evidence::EvidenceSnippets;

/// Separator placed between evidence sections in the corpus.
pub const EVIDENCE_SECTION_DELIMITER: &str = "\n\n--- EVIDENCE SECTION ---\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A non-fatal problem surfaced to the user after a mapping pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingNotice {
    pub level: NoticeLevel,
    pub unit: Option<String>,
    pub criterion: Option<String>,
    pub message: String,
}

/// Output of one mapping pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRun {
    pub results: MappingResults,
    pub notices: Vec<MappingNotice>,
    pub calls_made: usize,
}

/// Joins every non-blank snippet as `Type: {key}\nContent: {text}` in declaration order.
pub fn build_evidence_corpus(snippets: &EvidenceSnippets) -> String {
    snippets
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(kind, text)| format!("Type: {}\nContent: {}", kind.key(), text))
        .collect::<Vec<_>>()
        .join(EVIDENCE_SECTION_DELIMITER)
}

/// Runs the mapping pass sequentially, one remote call per target criterion.
pub async fn run_mapping(
    snippets: &EvidenceSnippets,
    catalog: &CompetencyCatalog,
    assessor: &dyn Assessor,
) -> MappingRun {
    let corpus = build_evidence_corpus(snippets);
    debug!(
        "Evidence corpus length: {} chars, starts with: {:?}",
        corpus.len(),
        corpus.chars().take(200).collect::<String>()
    );

    if corpus.trim().is_empty() {
        warn!("No readable evidence snippets provided; skipping mapping calls");
        return MappingRun {
            results: MappingResults::default(),
            notices: vec![MappingNotice {
                level: NoticeLevel::Warning,
                unit: None,
                criterion: None,
                message: "No readable evidence snippets were provided. \
                    Add evidence to see how it maps to the performance criteria."
                    .to_string(),
            }],
            calls_made: 0,
        };
    }

    let mut units = Vec::new();
    let mut notices = Vec::new();
    let mut calls_made = 0;

    for unit in catalog.target_units() {
        let mut criteria = Vec::with_capacity(unit.criteria.len());

        for pc in &unit.criteria {
            let prompt = build_mapping_prompt(&corpus, &unit.id, &pc.description);
            calls_made += 1;

            let (result, source) = match assessor.call(&prompt).await {
                Err(e) => {
                    warn!("Mapping call failed for {} PC {}: {e}", unit.code(), pc.key);
                    notices.push(MappingNotice {
                        level: NoticeLevel::Warning,
                        unit: Some(unit.id.clone()),
                        criterion: Some(pc.key.clone()),
                        message: format!(
                            "Error mapping evidence for '{}' - PC {}: {e}. Skipping this mapping.",
                            unit.id, pc.key
                        ),
                    });
                    (MappingResult::call_fallback(), MappingSource::CallFallback)
                }
                Ok(raw) => {
                    debug!(
                        "Raw mapping response for {} PC {}: {:?}",
                        unit.code(),
                        pc.key,
                        raw.chars().take(300).collect::<String>()
                    );
                    match parse_mapping_result(&raw) {
                        Ok(result) => (result, MappingSource::Assessed),
                        Err(e) => {
                            warn!("Could not parse mapping for {} PC {}: {e}", unit.code(), pc.key);
                            notices.push(MappingNotice {
                                level: NoticeLevel::Error,
                                unit: Some(unit.id.clone()),
                                criterion: Some(pc.key.clone()),
                                message: format!(
                                    "Could not parse AI response for {} - PC {}: {e}",
                                    unit.id, pc.key
                                ),
                            });
                            (MappingResult::parse_fallback(), MappingSource::ParseFallback)
                        }
                    }
                }
            };

            criteria.push(CriterionMapping {
                key: pc.key.clone(),
                result,
                source,
            });
        }

        units.push(UnitMapping {
            unit: unit.id.clone(),
            criteria,
        });
    }

    info!(
        "Mapping pass complete: {} calls, {} notices",
        calls_made,
        notices.len()
    );

    MappingRun {
        results: MappingResults { units },
        notices,
        calls_made,
    }
}
