//! Plain-text rendering of trees, tokens and diagnostics.
//!
//! [`format_tree`] prints one node per line, indented two spaces per level:
//!
//! ```text
//! translation-unit @1:1
//!   function-definition @1:1
//!     declaration-specifiers @1:1
//!       type-specifier int @1:1
//! ```
//!
//! [`flatten`] yields the same rows as data for the tree explorer.

use crate::parser::{Diagnostic, Node, SourceLocation, Token};
use std::fmt::Write;

/// One rendered line of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub depth: usize,
    pub label: String,
    pub location: SourceLocation,
}

/// `kind-name literal`, or just the kind name when the node has no literal.
pub fn node_label(node: &Node) -> String {
    match &node.literal {
        Some(literal) => format!("{} {}", node.kind, literal),
        None => node.kind.to_string(),
    }
}

/// Pre-order rows with depth, the shape shown by the explorer.
pub fn flatten(root: &Node) -> Vec<TreeRow> {
    let mut rows = Vec::with_capacity(root.size());
    root.walk(&mut |node, ancestors| {
        rows.push(TreeRow {
            depth: ancestors.len(),
            label: node_label(node),
            location: node.location,
        });
    });
    rows
}

pub fn format_tree(root: &Node) -> String {
    let mut out = String::new();
    for row in flatten(root) {
        let _ = writeln!(
            out,
            "{:indent$}{} @{}",
            "",
            row.label,
            row.location,
            indent = row.depth * 2
        );
    }
    out
}

/// `line:column KIND lexeme`, one token per line, end-of-file included.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{:<8} {:?} {}", token.location.to_string(), token.kind, token.lexeme);
    }
    out
}

pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let _ = writeln!(out, "{}", diagnostic);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, tokenize};

    #[test]
    fn test_format_tree_indents_children() {
        let unit = parse("int x;").translation_unit.unwrap();
        let text = format_tree(&unit);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "translation-unit @1:1",
                "  declaration @1:1",
                "    declaration-specifiers @1:1",
                "      type-specifier int @1:1",
                "    init-declarator @1:5",
                "      identifier x @1:5",
            ]
        );
    }

    #[test]
    fn test_flatten_matches_size() {
        let unit = parse("int f(void) { return 1 + 2; }").translation_unit.unwrap();
        let rows = flatten(&unit);
        assert_eq!(rows.len(), unit.size());
        assert_eq!(rows[0].depth, 0);
        assert!(rows.iter().any(|r| r.label == "additive-expression +"));
        assert!(rows.iter().any(|r| r.label == "integer-constant 2"));
    }

    #[test]
    fn test_format_tokens() {
        let tokens = tokenize("x;").unwrap();
        let text = format_tokens(&tokens);
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("1:1"));
        assert!(text.contains("Identifier x"));
    }
}
