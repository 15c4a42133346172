//! Output formatting for risk reports.

use std::fmt::Write;

use crate::error::Result;
use crate::model::{Quadrant, Report, Score};

impl Report {
    /// Format using a specific formatter.
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }
}

/// Trait for formatting risk reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &Report) -> Result<String>;
}

/// Machine-readable formatter. Field names and values match the model
/// types one-for-one; absent contract data is omitted.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        Ok(out)
    }
}

/// Aligned plain-text table, riskiest functions first.
pub struct TextFormatter;

fn location(score: &Score) -> String {
    format!("{}:{}", score.file.display(), score.line)
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut out = String::new();
        let summary = &report.summary;

        if report.scores.is_empty() {
            out.push_str("No functions found.\n");
        } else {
            let has_contract = summary.contract.is_some();
            let mut rows: Vec<&Score> = report.scores.iter().collect();
            rows.sort_by(|a, b| b.crap.total_cmp(&a.crap));

            let name_w = rows
                .iter()
                .map(|s| s.function.len())
                .max()
                .unwrap_or(0)
                .max("FUNCTION".len());
            let loc_w = rows
                .iter()
                .map(|s| location(s).len())
                .max()
                .unwrap_or(0)
                .max("LOCATION".len());

            write!(
                out,
                "{:<name_w$}  {:<loc_w$}  {:>5}  {:>7}  {:>8}",
                "FUNCTION", "LOCATION", "COMP", "COVER", "CRAP"
            )
            .unwrap();
            if has_contract {
                write!(out, "  {:>8}  {:>8}  QUADRANT", "CONTRACT", "C-CRAP").unwrap();
            }
            out.push('\n');
            let width = name_w + loc_w + 38 + if has_contract { 30 } else { 0 };
            writeln!(out, "{}", "-".repeat(width)).unwrap();

            for s in rows {
                write!(
                    out,
                    "{:<name_w$}  {:<loc_w$}  {:>5}  {:>6.1}%  {:>8.1}",
                    s.function,
                    location(s),
                    s.complexity,
                    s.line_coverage,
                    s.crap
                )
                .unwrap();
                match &s.contract {
                    Some(c) => write!(
                        out,
                        "  {:>7.1}%  {:>8.1}  {}",
                        c.contract_coverage, c.contract_crap, c.quadrant
                    )
                    .unwrap(),
                    None if has_contract => write!(out, "  {:>8}  {:>8}  -", "-", "-").unwrap(),
                    None => {}
                }
                out.push('\n');
            }
            out.push('\n');
        }

        writeln!(out, "Functions:        {}", summary.total_functions).unwrap();
        writeln!(out, "Avg complexity:   {:.1}", summary.avg_complexity).unwrap();
        writeln!(out, "Avg coverage:     {:.1}%", summary.avg_line_coverage).unwrap();
        writeln!(out, "Avg CRAP:         {:.1}", summary.avg_crap).unwrap();
        writeln!(
            out,
            "CRAPload:         {} (threshold {:.1})",
            summary.crapload, summary.crap_threshold
        )
        .unwrap();

        if let Some(contract) = &summary.contract {
            writeln!(out, "Avg contract cov: {:.1}%", contract.avg_contract_coverage).unwrap();
            writeln!(out, "Avg contract CRAP: {:.1}", contract.avg_contract_crap).unwrap();
            writeln!(
                out,
                "Contract CRAPload: {} (threshold {:.1})",
                contract.contract_crapload, contract.contract_crap_threshold
            )
            .unwrap();
            out.push_str("Quadrants:\n");
            for q in Quadrant::ALL {
                let n = contract.quadrant_counts.get(&q).copied().unwrap_or(0);
                writeln!(out, "  {:<24} {n}", q.as_str()).unwrap();
            }
        }

        Ok(out)
    }
}
