//! Per-function risk scoring.
//!
//! The risk of a function is `comp² × (1 − cov/100)³ + comp`: fully covered
//! code scores its complexity, uncovered code scores `comp² + comp`. When a
//! contract-coverage signal is available the same formula is applied to it
//! and the function is placed in a [`Quadrant`].

use serde::{Deserialize, Serialize};

use crate::complexity::FunctionComplexity;
use crate::generated::{is_test_file, GeneratedCache};
use crate::lookup::CoverageLookup;
use crate::model::{ContractRisk, Quadrant, Score};

pub const DEFAULT_CRAP_THRESHOLD: f64 = 15.0;
pub const DEFAULT_CONTRACT_CRAP_THRESHOLD: f64 = 15.0;

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Line-coverage risk at or above this value counts toward the load.
    pub crap_threshold: f64,
    /// Contract-coverage risk at or above this value counts toward the
    /// contract load.
    pub contract_crap_threshold: f64,
    /// Drop functions from generated files.
    pub ignore_generated: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            crap_threshold: DEFAULT_CRAP_THRESHOLD,
            contract_crap_threshold: DEFAULT_CONTRACT_CRAP_THRESHOLD,
            ignore_generated: true,
        }
    }
}

/// Source of contract coverage: how much of a function's observable
/// behavior its tests assert on, as a percentage. `None` means the
/// function is unknown to the source, which is not the same as 0%.
pub trait ContractCoverage {
    fn contract_coverage(&self, package: &str, function: &str) -> Option<f64>;
}

impl<F> ContractCoverage for F
where
    F: Fn(&str, &str) -> Option<f64>,
{
    fn contract_coverage(&self, package: &str, function: &str) -> Option<f64> {
        self(package, function)
    }
}

/// The risk formula.
#[must_use]
pub fn crap(complexity: u32, coverage_pct: f64) -> f64 {
    let comp = f64::from(complexity);
    let uncovered = 1.0 - coverage_pct / 100.0;
    comp * comp * uncovered.powi(3) + comp
}

/// Place a function given both risk values. Values equal to their
/// threshold count as high.
#[must_use]
pub fn classify(
    crap: f64,
    contract_crap: f64,
    crap_threshold: f64,
    contract_crap_threshold: f64,
) -> Quadrant {
    match (crap >= crap_threshold, contract_crap >= contract_crap_threshold) {
        (false, false) => Quadrant::Safe,
        (true, false) => Quadrant::ComplexButTested,
        (false, true) => Quadrant::SimpleButUnderspecified,
        (true, true) => Quadrant::Dangerous,
    }
}

/// Score every function reported by the complexity source.
///
/// Test files are always skipped; generated files are skipped when
/// `options.ignore_generated` is set, consulting `cache` so each file is
/// read once per run. Output order follows `functions`.
pub fn score_functions(
    functions: &[FunctionComplexity],
    lookup: &CoverageLookup,
    contract: Option<&dyn ContractCoverage>,
    options: &Options,
    cache: &mut GeneratedCache,
) -> Vec<Score> {
    let mut scores = Vec::with_capacity(functions.len());

    for func in functions {
        if is_test_file(&func.file) {
            continue;
        }
        if options.ignore_generated && cache.is_generated(&func.file) {
            tracing::debug!("Skipping generated {} in {}", func.function, func.file.display());
            continue;
        }

        // Complexity is at least one by definition; guard against sources
        // that report zero.
        let complexity = func.complexity.max(1);
        let line_coverage = lookup.percentage(&func.file, func.line);
        let crap_score = crap(complexity, line_coverage);

        let contract = contract
            .and_then(|c| c.contract_coverage(&func.package, &func.function))
            .map(|contract_coverage| {
                let contract_crap = crap(complexity, contract_coverage);
                ContractRisk {
                    contract_coverage,
                    contract_crap,
                    quadrant: classify(
                        crap_score,
                        contract_crap,
                        options.crap_threshold,
                        options.contract_crap_threshold,
                    ),
                }
            });

        scores.push(Score {
            package: func.package.clone(),
            function: func.function.clone(),
            file: func.file.clone(),
            line: func.line,
            complexity,
            line_coverage,
            crap: crap_score,
            contract,
        });
    }

    scores
}
