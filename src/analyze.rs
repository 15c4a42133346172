//! The end-to-end pipeline: profile → attributed coverage → scores →
//! report.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::attribute::attribute;
use crate::complexity::ComplexitySource;
use crate::error::{CovriskError, Result};
use crate::extent::extents_for_file;
use crate::generated::GeneratedCache;
use crate::lookup::CoverageLookup;
use crate::model::{FuncCoverage, Profile, Report};
use crate::parsers::gocover;
use crate::resolve::PathResolver;
use crate::runner::GoTestRunner;
use crate::score::{score_functions, ContractCoverage, Options};
use crate::summary::summarize;

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Module root; `go.mod` is read from here.
    pub root: PathBuf,
    /// Go package patterns such as `./...`.
    pub patterns: Vec<String>,
    /// Existing coverage profile. When absent, `go test` generates one.
    pub profile: Option<PathBuf>,
    pub options: Options,
}

impl Analysis {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns: vec!["./...".to_string()],
            profile: None,
            options: Options::default(),
        }
    }
}

/// Fail early on a profile path that is missing or not a regular file.
pub fn validate_profile_path(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CovriskError::ProfilePathInvalid(path.to_path_buf()))
    }
}

fn skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "go")
}

fn collect_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(dir).max_depth(if recursive { usize::MAX } else { 1 });
    for entry in walker.into_iter().filter_entry(|e| !skipped_dir(e)) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_go_file(entry.path()) => {
                out.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Skipping unreadable entry: {e}"),
        }
    }
}

/// Expand Go package patterns into the `.go` files they cover, sorted and
/// deduplicated.
pub fn discover_go_files(root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let (dir, recursive) = match pattern.strip_suffix("...") {
            Some(prefix) => (prefix.trim_end_matches('/'), true),
            None => (pattern.as_str(), false),
        };
        let dir = dir.strip_prefix("./").unwrap_or(dir);
        let dir = if dir.is_empty() || dir == "." {
            root.to_path_buf()
        } else {
            root.join(dir)
        };
        if dir.is_dir() {
            collect_dir(&dir, recursive, &mut files);
        } else {
            tracing::debug!("Pattern {pattern} matches no directory under {}", root.display());
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Attribute every resolvable file in `profile` to its functions.
///
/// Files that cannot be resolved or parsed are skipped; their functions
/// later score as uncovered.
pub fn attribute_profile(profile: &Profile, resolver: &PathResolver) -> Vec<FuncCoverage> {
    let mut coverage = Vec::new();
    for file in &profile.files {
        let Some(path) = resolver.resolve(&file.file_id) else {
            tracing::debug!("Could not resolve profile file {}", file.file_id);
            continue;
        };
        match extents_for_file(&path) {
            Ok(extents) => coverage.extend(attribute(&extents, &file.blocks)),
            Err(e) => tracing::debug!("Skipping {}: {e}", path.display()),
        }
    }
    coverage
}

fn load_profile(analysis: &Analysis) -> Result<Profile> {
    match &analysis.profile {
        Some(path) => {
            validate_profile_path(path)?;
            gocover::parse_file(path)
        }
        None => GoTestRunner::new(&analysis.root, analysis.patterns.clone()).run(),
    }
}

/// Score an already-parsed profile. This is the pure core of [`analyze`].
pub fn analyze_profile(
    analysis: &Analysis,
    profile: &Profile,
    complexity: &dyn ComplexitySource,
    contract: Option<&dyn ContractCoverage>,
) -> Result<Report> {
    let resolver = PathResolver::from_root(&analysis.root)?;
    if let Some(module) = resolver.module() {
        tracing::debug!("Resolving profile paths under module {module}");
    }
    let coverage = attribute_profile(profile, &resolver);
    let lookup = CoverageLookup::new(&coverage);
    tracing::info!(
        "Attributed coverage to {} functions across {} profile files",
        lookup.len(),
        profile.files.len()
    );

    let files = discover_go_files(&analysis.root, &analysis.patterns);
    let functions = complexity.collect(&files)?;

    let mut cache = GeneratedCache::new();
    let scores = score_functions(&functions, &lookup, contract, &analysis.options, &mut cache);
    if !cache.is_empty() {
        tracing::debug!("Checked {} files for generated-code markers", cache.len());
    }
    let summary = summarize(&scores, &analysis.options);
    tracing::info!(
        "Scored {} functions, crapload {}",
        summary.total_functions,
        summary.crapload
    );

    Ok(Report { scores, summary })
}

/// Run the full pipeline. Fatal errors (bad profile path, unparseable
/// profile, failed test run) abort before any score is produced.
pub fn analyze(
    analysis: &Analysis,
    complexity: &dyn ComplexitySource,
    contract: Option<&dyn ContractCoverage>,
) -> Result<Report> {
    let profile = load_profile(analysis)?;
    analyze_profile(analysis, &profile, complexity, contract)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "package x\n").unwrap();
    }

    fn rel(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_discover_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for f in [
            "main.go",
            "README.md",
            "pkg/a.go",
            "pkg/a_test.go",
            "pkg/sub/b.go",
            "vendor/v/v.go",
            "pkg/testdata/t.go",
            ".hidden/h.go",
            "_skip/s.go",
        ] {
            touch(root, f);
        }

        let all = discover_go_files(root, &["./...".to_string()]);
        assert_eq!(
            rel(root, &all),
            vec!["main.go", "pkg/a.go", "pkg/a_test.go", "pkg/sub/b.go"]
        );

        let pkg_only = discover_go_files(root, &["./pkg".to_string()]);
        assert_eq!(rel(root, &pkg_only), vec!["pkg/a.go", "pkg/a_test.go"]);

        let overlapping = discover_go_files(root, &["./pkg/...".to_string(), "pkg".to_string()]);
        assert_eq!(
            rel(root, &overlapping),
            vec!["pkg/a.go", "pkg/a_test.go", "pkg/sub/b.go"]
        );

        assert!(discover_go_files(root, &["./missing/...".to_string()]).is_empty());
    }

    #[test]
    fn test_validate_profile_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_profile_path(dir.path()),
            Err(CovriskError::ProfilePathInvalid(_))
        ));
        assert!(matches!(
            validate_profile_path(&dir.path().join("nope.out")),
            Err(CovriskError::ProfilePathInvalid(_))
        ));
        let file = dir.path().join("c.out");
        std::fs::write(&file, "mode: set\n").unwrap();
        assert!(validate_profile_path(&file).is_ok());
    }
}
