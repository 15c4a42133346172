//! Detection of machine-generated Go files.
//!
//! A file is generated when a line matching the Go toolchain convention
//! `// Code generated ... DO NOT EDIT.` appears before its package clause.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// Code generated .* DO NOT EDIT\.$").unwrap());

/// Whether `source` carries the generated-code marker ahead of its package
/// clause. Markers after the clause do not count.
#[must_use]
pub fn is_generated_source(source: &str) -> bool {
    for line in source.lines() {
        let line = line.trim_end();
        if line.starts_with("package ") || line == "package" {
            return false;
        }
        if MARKER_RE.is_match(line) {
            return true;
        }
    }
    false
}

/// Whether `path` names a Go test file.
#[must_use]
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

/// Per-run memo of generated-file checks. Owned by a single pipeline
/// invocation and passed explicitly to whatever needs it.
#[derive(Debug, Default)]
pub struct GeneratedCache {
    seen: HashMap<PathBuf, bool>,
}

impl GeneratedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `path`, reading it at most once. Unreadable files are treated
    /// as hand-written.
    pub fn is_generated(&mut self, path: &Path) -> bool {
        if let Some(&generated) = self.seen.get(path) {
            return generated;
        }
        let generated = match std::fs::read_to_string(path) {
            Ok(source) => is_generated_source(&source),
            Err(e) => {
                tracing::debug!("Could not read {} for generated check: {e}", path.display());
                false
            }
        };
        self.seen.insert(path.to_path_buf(), generated);
        generated
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
