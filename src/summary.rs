//! Reduction of per-function scores into a [`Summary`].

use std::collections::BTreeMap;

use crate::model::{ContractRisk, ContractSummary, Quadrant, Score, Summary};
use crate::score::Options;

/// Length of each worst-offender list.
pub const WORST_LIMIT: usize = 5;

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// The `limit` highest-scoring entries by `key`, descending. Ties keep
/// discovery order.
fn worst_by(scores: &[Score], limit: usize, key: impl Fn(&Score) -> Option<f64>) -> Vec<Score> {
    let mut ranked: Vec<(f64, &Score)> = scores
        .iter()
        .filter_map(|s| key(s).map(|k| (k, s)))
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, s)| s.clone())
        .collect()
}

fn contract_summary(scores: &[Score], options: &Options) -> Option<ContractSummary> {
    let contracts: Vec<&ContractRisk> = scores.iter().filter_map(|s| s.contract.as_ref()).collect();
    if contracts.is_empty() {
        return None;
    }

    let mut quadrant_counts: BTreeMap<Quadrant, usize> = BTreeMap::new();
    for c in &contracts {
        *quadrant_counts.entry(c.quadrant).or_default() += 1;
    }

    let n = contracts.len();
    Some(ContractSummary {
        contract_crapload: contracts
            .iter()
            .filter(|c| c.contract_crap >= options.contract_crap_threshold)
            .count(),
        contract_crap_threshold: options.contract_crap_threshold,
        avg_contract_crap: mean(contracts.iter().map(|c| c.contract_crap).sum(), n),
        avg_contract_coverage: mean(contracts.iter().map(|c| c.contract_coverage).sum(), n),
        quadrant_counts,
        worst_contract_crap: worst_by(scores, WORST_LIMIT, |s| {
            s.contract.map(|c| c.contract_crap)
        }),
    })
}

/// Build the summary for `scores`. Empty input yields zero counts and
/// means; the thresholds always echo `options`.
pub fn summarize(scores: &[Score], options: &Options) -> Summary {
    let n = scores.len();

    Summary {
        total_functions: n,
        avg_complexity: mean(scores.iter().map(|s| f64::from(s.complexity)).sum(), n),
        avg_line_coverage: mean(scores.iter().map(|s| s.line_coverage).sum(), n),
        avg_crap: mean(scores.iter().map(|s| s.crap).sum(), n),
        crapload: scores
            .iter()
            .filter(|s| s.crap >= options.crap_threshold)
            .count(),
        crap_threshold: options.crap_threshold,
        worst_crap: worst_by(scores, WORST_LIMIT, |s| Some(s.crap)),
        contract: contract_summary(scores, options),
    }
}
