//! Response parsing: decodes untrusted model output into typed records.
//!
//! The model is asked for JSON but nothing about its shape is assumed. Experience
//! analysis degrades to an empty assessment. A rejected criterion mapping is
//! replaced with the parse fallback by the mapping pass.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::assessment::{MappingResult, UnitRelevance};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("response has an unexpected shape: {0}")]
    Shape(String),
}

fn decode_json(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(strip_json_fences(raw)).map_err(ParseError::InvalidJson)
}

/// Decodes the experience analysis.
///
/// A payload that isn't JSON is an error. A JSON payload without a usable
/// `relevant_units_assessment` array yields an empty assessment, and individual
/// malformed entries are dropped.
pub fn parse_experience_analysis(raw: &str) -> Result<Vec<UnitRelevance>, ParseError> {
    let value = decode_json(raw)?;

    let Some(items) = value
        .get("relevant_units_assessment")
        .and_then(Value::as_array)
    else {
        warn!("Experience analysis has no relevant_units_assessment array");
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(
            |item| match serde_json::from_value::<UnitRelevance>(item.clone()) {
                Ok(unit) => Some(unit),
                Err(e) => {
                    warn!("Dropping malformed unit assessment: {e}");
                    None
                }
            },
        )
        .collect())
}

/// Decodes a criterion mapping. `confidence`, `explanation` and `suggested_action`
/// are all required; the caller substitutes `MappingResult::parse_fallback()` on error.
pub fn parse_mapping_result(raw: &str) -> Result<MappingResult, ParseError> {
    let value = decode_json(raw)?;
    serde_json::from_value(value).map_err(|e| ParseError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessment::{Confidence, Relevance};

    #[test]
    fn test_parse_experience_analysis_full() {
        let raw = r#"{
            "relevant_units_assessment": [
                {
                    "unit": "TAEDEL411 Facilitate vocational training",
                    "relevance": "Strongly Relevant",
                    "suggestions": ["Training plans", "Participant feedback", "Learning resources"]
                },
                {
                    "unit": "TAEASS412 Assess competence",
                    "relevance": "Moderately Relevant",
                    "suggestions": ["Assessment tools", "Assessment records"]
                }
            ]
        }"#;
        let units = parse_experience_analysis(raw).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].relevance, Relevance::StronglyRelevant);
        assert_eq!(units[0].suggestions.len(), 3);
        assert_eq!(units[1].unit, "TAEASS412 Assess competence");
    }

    #[test]
    fn test_parse_experience_analysis_missing_field_is_empty() {
        let units = parse_experience_analysis(r#"{"something_else": []}"#).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_parse_experience_analysis_wrong_type_is_empty() {
        let units =
            parse_experience_analysis(r#"{"relevant_units_assessment": "none"}"#).unwrap();
        assert!(units.is_empty());
        let units = parse_experience_analysis("[1, 2, 3]").unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_parse_experience_analysis_drops_malformed_items() {
        let raw = r#"{"relevant_units_assessment": [
            {"unit": "TAEDEL411 Facilitate vocational training", "relevance": "Very"},
            {"unit": "TAEASS412 Assess competence", "relevance": "Not Clearly Relevant", "suggestions": []}
        ]}"#;
        let units = parse_experience_analysis(raw).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].relevance, Relevance::NotClearlyRelevant);
    }

    #[test]
    fn test_parse_experience_analysis_not_json_is_error() {
        let err = parse_experience_analysis("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_experience_analysis_strips_fences() {
        let raw = "```json\n{\"relevant_units_assessment\": []}\n```";
        assert!(parse_experience_analysis(raw).unwrap().is_empty());
    }

    #[test]
    fn test_parse_mapping_result_valid() {
        let raw = r#"{
            "confidence": "Medium",
            "explanation": "The plan mentions learner needs but not adjustments.",
            "suggested_action": "Add a customised session plan."
        }"#;
        let result = parse_mapping_result(raw).unwrap();
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.suggested_action, "Add a customised session plan.");
    }

    #[test]
    fn test_parse_mapping_result_not_json() {
        assert!(matches!(
            parse_mapping_result("not json"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_mapping_result_missing_confidence() {
        let raw = r#"{"explanation": "x", "suggested_action": "y"}"#;
        assert!(matches!(parse_mapping_result(raw), Err(ParseError::Shape(_))));
    }

    #[test]
    fn test_parse_mapping_result_unknown_confidence() {
        let raw = r#"{"confidence": "Certain", "explanation": "x", "suggested_action": "y"}"#;
        assert!(parse_mapping_result(raw).is_err());
    }

    #[test]
    fn test_parse_mapping_result_strips_fences() {
        let raw = "```json\n{\"confidence\": \"High\", \"explanation\": \"x\", \"suggested_action\": \"y\"}\n```";
        assert_eq!(parse_mapping_result(raw).unwrap().confidence, Confidence::High);
    }
}
