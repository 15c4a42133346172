//! Command handler functions for the covrisk CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::analyze::{analyze, attribute_profile, validate_profile_path, Analysis};
use crate::complexity::Cyclomatic;
use crate::gate::{evaluate, GateOptions, GateReport};
use crate::parsers::gocover;
use crate::report::{JsonFormatter, ReportFormatter, TextFormatter};
use crate::resolve::PathResolver;

/// Output style for the `report` command.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Style {
    Text,
    Json,
}

/// Rendered report plus the gate results the caller acts on.
pub struct ReportOutcome {
    pub output: String,
    pub gate: GateReport,
}

pub fn cmd_report(analysis: &Analysis, style: Style, gate: &GateOptions) -> Result<ReportOutcome> {
    let complexity = Cyclomatic::default();
    let report = analyze(analysis, &complexity, None).context("Analysis failed")?;

    let formatter: &dyn ReportFormatter = match style {
        Style::Text => &TextFormatter,
        Style::Json => &JsonFormatter,
    };
    let output = report.format(formatter)?;
    let gate = evaluate(&report.summary, gate);

    Ok(ReportOutcome { output, gate })
}

/// Per-function statement coverage from a profile, in profile order.
pub fn cmd_coverage(root: &Path, profile_path: &Path) -> Result<String> {
    validate_profile_path(profile_path)?;
    let profile = gocover::parse_file(profile_path)
        .with_context(|| format!("Failed to parse {}", profile_path.display()))?;
    let resolver = PathResolver::from_root(root)?;
    let coverage = attribute_profile(&profile, &resolver);

    if coverage.is_empty() {
        return Ok("No functions matched the coverage profile.\n".to_string());
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>8} {:>8} {:>8}",
        "FUNCTION", "STMTS", "COVERED", "RATE"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(87)).unwrap();

    for fc in &coverage {
        let name = format!("{}:{} {}", fc.file.display(), fc.start_line, fc.function);
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>7.1}%",
            name, fc.total, fc.covered, fc.percentage
        )
        .unwrap();
    }

    Ok(out)
}
