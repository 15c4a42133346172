//! Function extent discovery for Go source files using tree-sitter.
//!
//! Only declarations with a body are reported. Methods are named after
//! their receiver type, e.g. `(*Server).Close` or `(Set[K]).Len`.

use std::path::Path;

use tree_sitter::{Node, Parser, Point, Tree};

use crate::error::{CovriskError, Result};
use crate::model::{FunctionExtent, Position};

/// Parse Go source, failing on any syntax error.
pub(crate) fn parse_tree(source: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| CovriskError::Other(format!("Failed to set Go language: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| CovriskError::SourceParse(path.to_path_buf()))?;
    if tree.root_node().has_error() {
        return Err(CovriskError::SourceParse(path.to_path_buf()));
    }
    Ok(tree)
}

/// Top-level function and method declarations that have a body, in
/// source order.
pub(crate) fn function_declarations(root: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = root.walk();
    let decls = root
        .children(&mut cursor)
        .filter(|n| matches!(n.kind(), "function_declaration" | "method_declaration"))
        .filter(|n| n.child_by_field_name("body").is_some())
        .collect();
    decls
}

/// Name of the package declared by the file.
pub(crate) fn package_name(root: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut cursor = clause.walk();
    let ident = clause
        .children(&mut cursor)
        .find(|n| n.kind() == "package_identifier")?;
    ident.utf8_text(source).ok().map(str::to_string)
}

/// Receiver-qualified declaration name.
pub(crate) fn declaration_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    if node.kind() != "method_declaration" {
        return Some(name.to_string());
    }
    match receiver_type(node, source) {
        Some(recv) => Some(format!("({recv}).{name}")),
        None => Some(name.to_string()),
    }
}

fn receiver_type(method: Node<'_>, source: &[u8]) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let param = receiver
        .children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    while ty.kind() == "parenthesized_type" {
        ty = ty.named_child(0)?;
    }
    let text = ty.utf8_text(source).ok()?;
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn position(point: Point) -> Position {
    Position::new(point.row as u32 + 1, point.column as u32 + 1)
}

/// Read `path` and enumerate its function extents.
pub fn extents_for_file(path: &Path) -> Result<Vec<FunctionExtent>> {
    let source = std::fs::read_to_string(path)?;
    extents_for_source(&source, path)
}

/// Enumerate function extents in already-loaded source text.
pub fn extents_for_source(source: &str, path: &Path) -> Result<Vec<FunctionExtent>> {
    let tree = parse_tree(source, path)?;
    let bytes = source.as_bytes();

    let extents = function_declarations(tree.root_node())
        .into_iter()
        .filter_map(|node| {
            Some(FunctionExtent {
                name: declaration_name(node, bytes)?,
                file: path.to_path_buf(),
                start: position(node.start_position()),
                end: position(node.end_position()),
            })
        })
        .collect();
    Ok(extents)
}
