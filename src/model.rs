//! Uniform in-memory representation of the data flowing through the
//! scoring pipeline: profile blocks, function extents, attributed coverage,
//! and the final per-function scores and summary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Compute a coverage percentage, returning 0.0 when the total is zero.
#[must_use]
pub fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * covered as f64 / total as f64
    }
}

/// A 1-based line/column position. Columns are byte offsets, as in Go
/// coverage profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.col)
    }
}

/// One basic block from a coverage profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageBlock {
    pub start: Position,
    pub end: Position,
    pub num_stmt: u64,
    /// Execution count; 0 means the block never ran.
    pub count: u64,
}

/// All blocks recorded for one profile file identifier, ordered by
/// ascending start position.
#[derive(Debug, Clone, Default)]
pub struct ProfileFile {
    pub file_id: String,
    pub blocks: Vec<CoverageBlock>,
}

/// The complete result of parsing a coverage profile.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub mode: String,
    pub files: Vec<ProfileFile>,
}

/// Source span of a function or method declaration that has a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionExtent {
    /// Bare name for functions, `(T).M` or `(*T).M` for methods.
    pub name: String,
    pub file: PathBuf,
    pub start: Position,
    pub end: Position,
}

/// Statement coverage attributed to a single function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncCoverage {
    pub file: PathBuf,
    pub function: String,
    pub start_line: u32,
    pub end_line: u32,
    pub covered: u64,
    pub total: u64,
    pub percentage: f64,
}

/// Risk quadrant formed by crossing the line-coverage and contract-coverage
/// risk scores against their thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quadrant {
    Safe,
    ComplexButTested,
    SimpleButUnderspecified,
    Dangerous,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Safe,
        Quadrant::ComplexButTested,
        Quadrant::SimpleButUnderspecified,
        Quadrant::Dangerous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Safe => "Safe",
            Quadrant::ComplexButTested => "ComplexButTested",
            Quadrant::SimpleButUnderspecified => "SimpleButUnderspecified",
            Quadrant::Dangerous => "Dangerous",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contract-coverage half of a score. Either all three values exist
/// or the score carries none of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContractRisk {
    pub contract_coverage: f64,
    pub contract_crap: f64,
    pub quadrant: Quadrant,
}

/// Per-function risk score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub package: String,
    pub function: String,
    pub file: PathBuf,
    pub line: u32,
    pub complexity: u32,
    pub line_coverage: f64,
    pub crap: f64,
    #[serde(flatten)]
    pub contract: Option<ContractRisk>,
}

/// Summary fields that only exist when at least one score carries a
/// contract-coverage signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSummary {
    pub contract_crapload: usize,
    pub contract_crap_threshold: f64,
    pub avg_contract_crap: f64,
    pub avg_contract_coverage: f64,
    pub quadrant_counts: BTreeMap<Quadrant, usize>,
    pub worst_contract_crap: Vec<Score>,
}

/// Aggregate statistics over all scores of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_functions: usize,
    pub avg_complexity: f64,
    pub avg_line_coverage: f64,
    pub avg_crap: f64,
    pub crapload: usize,
    pub crap_threshold: f64,
    pub worst_crap: Vec<Score>,
    #[serde(flatten)]
    pub contract: Option<ContractSummary>,
}

/// Output of one analysis invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub scores: Vec<Score>,
    pub summary: Summary,
}
