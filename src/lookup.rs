//! O(1) coverage lookup keyed by function position.
//!
//! The complexity collaborator may spell paths differently from the
//! profile resolver (relative vs absolute, `./` prefixes), so lookups fall
//! back to the file's basename when the exact path misses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::FuncCoverage;

/// Normalize a path by removing a leading `./`.
fn normalize_path(path: &Path) -> PathBuf {
    path.strip_prefix("./").unwrap_or(path).to_path_buf()
}

fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Coverage percentages indexed by (file, start line).
#[derive(Debug, Clone, Default)]
pub struct CoverageLookup {
    exact: HashMap<(PathBuf, u32), f64>,
    by_basename: HashMap<(String, u32), f64>,
}

impl CoverageLookup {
    pub fn new(coverage: &[FuncCoverage]) -> Self {
        let mut lookup = Self::default();
        for fc in coverage {
            lookup
                .exact
                .insert((normalize_path(&fc.file), fc.start_line), fc.percentage);
            if let Some(name) = basename(&fc.file) {
                lookup
                    .by_basename
                    .insert((name, fc.start_line), fc.percentage);
            }
        }
        lookup
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Coverage percentage of the function starting at `line` in `file`,
    /// or 0.0 when no coverage data is known for it.
    #[must_use]
    pub fn percentage(&self, file: &Path, line: u32) -> f64 {
        if let Some(&pct) = self.exact.get(&(normalize_path(file), line)) {
            return pct;
        }
        basename(file)
            .and_then(|name| self.by_basename.get(&(name, line)).copied())
            .unwrap_or(0.0)
    }
}
