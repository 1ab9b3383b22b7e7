//! Report rendering: turns mapping results into per-unit gap-analysis tables.

use serde::Serialize;

use crate::catalog::CompetencyCatalog;
use crate::models::assessment::{Confidence, MappingResult, MappingResults};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub status: String,
    pub meaning: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub performance_criterion: String,
    pub status: String,
    pub explanation: String,
    pub suggested_action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTable {
    pub unit: String,
    pub rows: Vec<ReportRow>,
    /// Set when the results hold nothing for this unit.
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub title: String,
    pub legend: Vec<LegendEntry>,
    pub units: Vec<UnitTable>,
}

fn legend() -> Vec<LegendEntry> {
    vec![
        LegendEntry {
            status: format!("{} High", Confidence::High.icon()),
            meaning: "Strong indication of evidence for this criterion.",
        },
        LegendEntry {
            status: format!("{} Medium", Confidence::Medium.icon()),
            meaning: "Some evidence, but might need more detail or clarification.",
        },
        LegendEntry {
            status: format!("{} None/Low", Confidence::None.icon()),
            meaning: "No clear evidence identified yet for this criterion, or evidence is weak.",
        },
    ]
}

/// Renders one table per target unit, rows in catalog order. Criteria without a
/// result are shown with `MappingResult::not_analysed()`.
pub fn render_report(results: &MappingResults, catalog: &CompetencyCatalog) -> Report {
    let placeholder = MappingResult::not_analysed();

    let units = catalog
        .target_units()
        .into_iter()
        .map(|unit| {
            let note = results.unit(&unit.id).is_none().then(|| {
                format!("No detailed mapping results found for {}.", unit.id)
            });

            let rows = unit
                .criteria
                .iter()
                .map(|pc| {
                    let result = results
                        .get(&unit.id, &pc.key)
                        .map(|c| &c.result)
                        .unwrap_or(&placeholder);
                    ReportRow {
                        performance_criterion: format!("{} {}", pc.key, pc.description),
                        status: format!("{} {}", result.confidence.icon(), result.confidence),
                        explanation: result.explanation.clone(),
                        suggested_action: result.suggested_action.clone(),
                    }
                })
                .collect();

            UnitTable {
                unit: unit.id.clone(),
                rows,
                note,
            }
        })
        .collect();

    Report {
        title: format!("Personalized RPL Mapping Report: {}", catalog.qualification),
        legend: legend(),
        units,
    }
}

/// Keeps a cell on one line and stops `|` from splitting the column.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Report {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);

        for entry in &self.legend {
            out.push_str(&format!("* **{}:** {}\n", entry.status, entry.meaning));
        }

        for table in &self.units {
            out.push_str(&format!("\n## Unit: {}\n\n", table.unit));
            if let Some(note) = &table.note {
                out.push_str(&format!("_{note}_\n\n"));
            }
            out.push_str(
                "| Performance Criterion | Status | AI Explanation | AI Suggested Actions / Gaps |\n",
            );
            out.push_str("|---|---|---|---|\n");
            for row in &table.rows {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    cell(&row.performance_criterion),
                    cell(&row.status),
                    cell(&row.explanation),
                    cell(&row.suggested_action)
                ));
            }
        }

        out
    }
}
