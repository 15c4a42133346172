//! Per-function cyclomatic complexity.
//!
//! Scoring treats complexity as an external input behind the
//! [`ComplexitySource`] trait. [`Cyclomatic`] is the default source: it
//! counts decision points in the style of `gocyclo`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tree_sitter::Node;

use crate::error::Result;
use crate::extent::{declaration_name, function_declarations, package_name, parse_tree};
use crate::generated::is_test_file;

/// Complexity of one function, as reported by a [`ComplexitySource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionComplexity {
    pub package: String,
    pub function: String,
    pub file: PathBuf,
    pub line: u32,
    /// Always at least 1.
    pub complexity: u32,
}

/// Anything that can report per-function complexity for a set of files.
pub trait ComplexitySource {
    fn collect(&self, files: &[PathBuf]) -> Result<Vec<FunctionComplexity>>;
}

/// Decision-point counter over tree-sitter-go syntax trees.
#[derive(Debug, Clone)]
pub struct Cyclomatic {
    pub skip_tests: bool,
}

impl Default for Cyclomatic {
    fn default() -> Self {
        Self { skip_tests: true }
    }
}

impl ComplexitySource for Cyclomatic {
    fn collect(&self, files: &[PathBuf]) -> Result<Vec<FunctionComplexity>> {
        let mut out = Vec::new();
        for file in files {
            if self.skip_tests && is_test_file(file) {
                continue;
            }
            let source = match std::fs::read_to_string(file) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!("Skipping {}: {e}", file.display());
                    continue;
                }
            };
            match file_complexity(&source, file) {
                Ok(funcs) => out.extend(funcs),
                Err(e) => tracing::debug!("Skipping {}: {e}", file.display()),
            }
        }
        Ok(out)
    }
}

/// Complexity of every function with a body in `source`.
pub fn file_complexity(source: &str, path: &Path) -> Result<Vec<FunctionComplexity>> {
    let tree = parse_tree(source, path)?;
    let root = tree.root_node();
    let bytes = source.as_bytes();
    let package = package_name(root, bytes).unwrap_or_default();

    let funcs = function_declarations(root)
        .into_iter()
        .filter_map(|node| {
            Some(FunctionComplexity {
                package: package.clone(),
                function: declaration_name(node, bytes)?,
                file: path.to_path_buf(),
                line: node.start_position().row as u32 + 1,
                complexity: cyclomatic(node),
            })
        })
        .collect();
    Ok(funcs)
}

fn branch_weight(node: Node<'_>) -> u32 {
    match node.kind() {
        "if_statement" | "for_statement" => 1,
        // Default clauses are not decisions.
        "expression_case" | "type_case" | "communication_case" => 1,
        "binary_expression" => node
            .child_by_field_name("operator")
            .map_or(0, |op| u32::from(matches!(op.kind(), "&&" | "||"))),
        _ => 0,
    }
}

/// 1 + the number of branch points below `node`. Closures count toward
/// the enclosing function.
///
/// Long operator chains nest arbitrarily deep, so the walk keeps its
/// position in a cursor instead of recursing.
pub fn cyclomatic(node: Node<'_>) -> u32 {
    let mut complexity = 1;
    let mut cursor = node.walk();
    loop {
        complexity += branch_weight(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return complexity;
            }
        }
    }
}
