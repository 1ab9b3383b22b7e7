use std::fmt;

use serde::{Deserialize, Serialize};

/// How relevant the candidate's experience looks for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relevance {
    #[serde(rename = "Strongly Relevant", alias = "strongly relevant", alias = "StronglyRelevant")]
    StronglyRelevant,
    #[serde(
        rename = "Moderately Relevant",
        alias = "moderately relevant",
        alias = "ModeratelyRelevant"
    )]
    ModeratelyRelevant,
    #[serde(
        rename = "Not Clearly Relevant",
        alias = "not clearly relevant",
        alias = "NotClearlyRelevant"
    )]
    NotClearlyRelevant,
}

/// One entry of the experience analysis: a unit, its relevance, and suggested evidence types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRelevance {
    pub unit: String,
    pub relevance: Relevance,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Strength of evidence for a single performance criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "none", alias = "NONE")]
    None,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::None => "None",
        }
    }

    /// ✔️ for High, ❓ for Medium, ❌ for Low and None.
    pub fn icon(&self) -> &'static str {
        match self {
            Confidence::High => "✔️",
            Confidence::Medium => "❓",
            Confidence::Low | Confidence::None => "❌",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The assessment of one performance criterion against the evidence corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    pub confidence: Confidence,
    pub explanation: String,
    pub suggested_action: String,
}

impl MappingResult {
    /// Placeholder for a criterion that was never assessed.
    pub fn not_analysed() -> Self {
        Self {
            confidence: Confidence::None,
            explanation: "no analysis performed".to_string(),
            suggested_action: "provide evidence".to_string(),
        }
    }

    /// Substituted when the service answered but the answer could not be decoded.
    pub fn parse_fallback() -> Self {
        Self {
            confidence: Confidence::Low,
            explanation: "response parsing failed".to_string(),
            suggested_action: "review evidence manually".to_string(),
        }
    }

    /// Substituted when the remote call itself failed.
    pub fn call_fallback() -> Self {
        Self {
            confidence: Confidence::None,
            explanation: "API call failed for this criterion".to_string(),
            suggested_action: "check connectivity/credentials and retry".to_string(),
        }
    }
}

/// Where a criterion's `MappingResult` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Assessed,
    ParseFallback,
    CallFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionMapping {
    pub key: String,
    #[serde(flatten)]
    pub result: MappingResult,
    pub source: MappingSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitMapping {
    pub unit: String,
    pub criteria: Vec<CriterionMapping>,
}

/// Unit → criterion key → result, kept in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MappingResults {
    pub units: Vec<UnitMapping>,
}

impl MappingResults {
    pub fn unit(&self, unit: &str) -> Option<&UnitMapping> {
        self.units.iter().find(|u| u.unit == unit)
    }

    pub fn get(&self, unit: &str, key: &str) -> Option<&CriterionMapping> {
        self.unit(unit)?.criteria.iter().find(|c| c.key == key)
    }

    /// Total number of criterion entries across all units.
    pub fn leaf_count(&self) -> usize {
        self.units.iter().map(|u| u.criteria.len()).sum()
    }
}
