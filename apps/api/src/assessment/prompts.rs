// All LLM prompt templates for experience analysis and evidence mapping.
// Reuses cross-cutting fragments from llm_client::prompts.
//
// User text is always substituted last so it can never be mistaken for a placeholder.

use serde_json::{json, Value};

use crate::catalog::CompetencyCatalog;
use crate::llm_client::prompts::{ASSESSOR_PERSONA, JSON_ONLY_INSTRUCTION};

/// Experience analysis prompt template.
/// Replace: {persona}, {unit_list}, {example_json}, {json_only}, then {experience_text}.
pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"{persona}
Candidate experience: "{experience_text}"

Identify relevance to these TAE40122 core units:
{unit_list}

For each unit, state relevance ("Strongly Relevant" | "Moderately Relevant" | "Not Clearly Relevant") and list 3-5 specific evidence types.

Output JSON:
{example_json}

{json_only}"#;

/// Evidence mapping prompt template.
/// Replace: {persona}, {json_only}, {unit}, {pc_description}, then {evidence_json}.
pub const MAPPING_PROMPT_TEMPLATE: &str = r#"{persona}
Assess evidence against a Performance Criterion (PC).

Unit: {unit}
PC: {pc_description}

Candidate's Evidence: {evidence_json}

Output JSON:
{
    "confidence": "High" | "Medium" | "Low" | "None",
    "explanation": "Concise reason for confidence, referencing evidence.",
    "suggested_action": "Actionable advice for gaps."
}

Confidence levels: High (strong support), Medium (partial/implies, needs more), Low/None (no clear support, missing).

{json_only}"#;

/// Builds the experience analysis prompt. The experience text is embedded verbatim.
pub fn build_experience_prompt(experience_text: &str, catalog: &CompetencyCatalog) -> String {
    let targets = catalog.target_units();

    let unit_list = targets
        .iter()
        .map(|u| format!("- {}", u.id))
        .collect::<Vec<_>>()
        .join("\n");

    let example: Vec<Value> = targets
        .iter()
        .map(|u| {
            json!({
                "unit": u.id,
                "relevance": "Strongly Relevant",
                "suggestions": ["Evidence type 1", "Evidence type 2", "Evidence type 3"],
            })
        })
        .collect();
    let example_json = format!("{:#}", json!({ "relevant_units_assessment": example }));

    EXPERIENCE_PROMPT_TEMPLATE
        .replace("{persona}", ASSESSOR_PERSONA)
        .replace("{unit_list}", &unit_list)
        .replace("{example_json}", &example_json)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{experience_text}", experience_text)
}

/// Builds the mapping prompt for one criterion. The corpus is embedded as a JSON
/// string literal so quotes, backslashes and newlines can't break the prompt.
pub fn build_mapping_prompt(evidence_corpus: &str, unit_id: &str, pc_description: &str) -> String {
    let evidence_json = Value::String(evidence_corpus.to_string()).to_string();

    MAPPING_PROMPT_TEMPLATE
        .replace("{persona}", ASSESSOR_PERSONA)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{unit}", unit_id)
        .replace("{pc_description}", pc_description)
        .replace("{evidence_json}", &evidence_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVIDENCE_MARKER: &str = "Candidate's Evidence: ";

    /// Pulls the JSON literal that follows `EVIDENCE_MARKER` back out of a prompt.
    fn extract_evidence(prompt: &str) -> String {
        let line = prompt
            .lines()
            .find_map(|l| l.strip_prefix(EVIDENCE_MARKER))
            .expect("prompt has an evidence line");
        serde_json::from_str(line).expect("evidence segment is a JSON string")
    }

    #[test]
    fn test_experience_prompt_embeds_text_verbatim() {
        let catalog = CompetencyCatalog::tae40122();
        let text = "I have delivered workplace training to new employees for 3 years.";
        let prompt = build_experience_prompt(text, &catalog);
        assert!(prompt.contains(text));
        assert!(prompt.contains("relevant_units_assessment"));
    }

    #[test]
    fn test_experience_prompt_names_exactly_the_target_units() {
        let catalog = CompetencyCatalog::tae40122();
        let prompt = build_experience_prompt("Trainer", &catalog);
        for unit in catalog.target_units() {
            assert!(prompt.contains(&format!("- {}", unit.id)));
        }
        let listed = prompt.lines().filter(|l| l.starts_with("- TAE")).count();
        assert_eq!(listed, 2);
    }

    #[test]
    fn test_experience_prompt_keeps_placeholder_like_text() {
        let catalog = CompetencyCatalog::tae40122();
        let text = "I wrote {unit_list} and \"quoted\" things\nover two lines";
        let prompt = build_experience_prompt(text, &catalog);
        assert!(prompt.contains(text));
    }

    #[test]
    fn test_experience_prompt_accepts_empty_text() {
        let catalog = CompetencyCatalog::tae40122();
        let prompt = build_experience_prompt("", &catalog);
        assert!(prompt.contains("Candidate experience: \"\""));
    }

    #[test]
    fn test_mapping_prompt_names_unit_and_criterion() {
        let prompt = build_mapping_prompt(
            "Type: training_plan\nContent: outline",
            "TAEASS412 Assess competence",
            "Seek feedback relevant to own assessment practice.",
        );
        assert!(prompt.contains("Unit: TAEASS412 Assess competence"));
        assert!(prompt.contains("PC: Seek feedback relevant to own assessment practice."));
        assert!(prompt.contains("\"suggested_action\""));
    }

    #[test]
    fn test_mapping_prompt_evidence_round_trips() {
        let corpora = [
            "He said \"use the checklist\" twice",
            "C:\\training\\plans\\week1.docx",
            "line one\nline two\r\n\ttabbed",
            "control \u{0007} bell and \u{0000} nul",
            "{evidence_json} literal placeholder",
            "",
        ];
        for corpus in corpora {
            let prompt = build_mapping_prompt(corpus, "TAEDEL411 Facilitate vocational training", "PC");
            assert_eq!(extract_evidence(&prompt), corpus);
        }
    }
}
