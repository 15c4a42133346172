//! CI gating on risk load.
//!
//! Each configured maximum is compared with the actual load from the
//! summary. A maximum of 0 disables enforcement for that metric. A load
//! equal to its maximum passes.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Summary;

/// Maximum loads to enforce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateOptions {
    pub max_crapload: usize,
    pub max_contract_crapload: usize,
}

impl GateOptions {
    pub fn is_enforcing(&self) -> bool {
        self.max_crapload > 0 || self.max_contract_crapload > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Crapload,
    ContractCrapload,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Crapload => "crapload",
            Metric::ContractCrapload => "contract crapload",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one enforced metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateCheck {
    pub metric: Metric,
    /// `None` when the signal was never computed.
    pub actual: Option<usize>,
    pub max: usize,
    pub passed: bool,
}

/// A load above its configured maximum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{metric} {actual} exceeds maximum {max}")]
pub struct ThresholdViolation {
    pub metric: Metric,
    pub actual: usize,
    pub max: usize,
}

/// Per-metric gate results, in metric order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub checks: Vec<GateCheck>,
}

impl GateReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// The first failing check, or `Ok` when every check passed.
    pub fn verdict(&self) -> Result<(), ThresholdViolation> {
        match self.checks.iter().find(|c| !c.passed) {
            Some(check) => Err(ThresholdViolation {
                metric: check.metric,
                actual: check.actual.unwrap_or_default(),
                max: check.max,
            }),
            None => Ok(()),
        }
    }

    pub fn format_text(&self) -> String {
        let mut out = String::new();
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            let actual = match check.actual {
                Some(n) => n.to_string(),
                None => "n/a".to_string(),
            };
            writeln!(
                out,
                "{status}  {} {actual} (max {})",
                check.metric, check.max
            )
            .unwrap();
        }
        out
    }
}

/// Compare the summary's loads with the configured maximums.
pub fn evaluate(summary: &Summary, options: &GateOptions) -> GateReport {
    let mut checks = Vec::new();

    if options.max_crapload > 0 {
        checks.push(GateCheck {
            metric: Metric::Crapload,
            actual: Some(summary.crapload),
            max: options.max_crapload,
            passed: summary.crapload <= options.max_crapload,
        });
    }

    if options.max_contract_crapload > 0 {
        let actual = summary.contract.as_ref().map(|c| c.contract_crapload);
        checks.push(GateCheck {
            metric: Metric::ContractCrapload,
            actual,
            max: options.max_contract_crapload,
            // Nothing to enforce against when the signal was never computed.
            passed: actual.map_or(true, |n| n <= options.max_contract_crapload),
        });
    }

    GateReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContractSummary;
    use std::collections::BTreeMap;

    fn summary(crapload: usize, contract_crapload: Option<usize>) -> Summary {
        Summary {
            total_functions: 10,
            avg_complexity: 1.0,
            avg_line_coverage: 0.0,
            avg_crap: 0.0,
            crapload,
            crap_threshold: 15.0,
            worst_crap: vec![],
            contract: contract_crapload.map(|n| ContractSummary {
                contract_crapload: n,
                contract_crap_threshold: 15.0,
                avg_contract_crap: 0.0,
                avg_contract_coverage: 0.0,
                quadrant_counts: BTreeMap::new(),
                worst_contract_crap: vec![],
            }),
        }
    }

    #[test]
    fn test_equal_to_max_passes() {
        let options = GateOptions {
            max_crapload: 5,
            ..GateOptions::default()
        };
        let report = evaluate(&summary(5, None), &options);
        assert!(report.passed());
        assert_eq!(report.verdict(), Ok(()));
    }

    #[test]
    fn test_above_max_fails() {
        let options = GateOptions {
            max_crapload: 5,
            ..GateOptions::default()
        };
        let report = evaluate(&summary(6, None), &options);
        let err = report.verdict().unwrap_err();
        assert_eq!(err.actual, 6);
        assert_eq!(err.max, 5);
        let msg = err.to_string();
        assert!(msg.contains('6') && msg.contains('5'), "{msg}");
    }

    #[test]
    fn test_zero_max_is_report_only() {
        let report = evaluate(&summary(100, Some(100)), &GateOptions::default());
        assert!(report.checks.is_empty());
        assert!(report.passed());
        assert!(!GateOptions::default().is_enforcing());
    }

    #[test]
    fn test_contract_max_without_signal_passes() {
        let options = GateOptions {
            max_crapload: 0,
            max_contract_crapload: 1,
        };
        let report = evaluate(&summary(0, None), &options);
        assert_eq!(report.checks.len(), 1);
        assert!(report.checks[0].passed);
        assert_eq!(report.checks[0].actual, None);
        assert!(report.format_text().contains("n/a"));
    }

    #[test]
    fn test_first_violation_surfaces_with_full_breakdown() {
        let options = GateOptions {
            max_crapload: 2,
            max_contract_crapload: 2,
        };
        let report = evaluate(&summary(3, Some(4)), &options);
        assert_eq!(report.checks.len(), 2);
        assert!(report.checks.iter().all(|c| !c.passed));
        assert_eq!(report.verdict().unwrap_err().metric, Metric::Crapload);

        let report = evaluate(&summary(1, Some(4)), &options);
        let err = report.verdict().unwrap_err();
        assert_eq!(err.metric, Metric::ContractCrapload);
        let text = report.format_text();
        assert!(text.contains("PASS  crapload 1 (max 2)"));
        assert!(text.contains("FAIL  contract crapload 4 (max 2)"));
    }
}
