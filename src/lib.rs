//! # Introduction
//!
//! ctree is a front end for C: it tokenizes source text, builds a uniform
//! syntax tree with a recursive-descent parser, and reports every syntax
//! error it can find in one pass instead of stopping at the first. The tree
//! can be printed, dumped as JSON, or explored in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → Tree + Diagnostics → Printer / TUI
//! ```
//!
//! 1. [`parser`] — tokenizes the source and builds the tree; malformed
//!    constructs become [`parser::Diagnostic`]s and parsing resumes at the
//!    next statement or declaration.
//! 2. [`config`] — knobs shared by the lexer, the parser and the CLI.
//! 3. [`printer`] — indented text rendering and row flattening of trees.
//! 4. [`ui`] — ratatui-based tree explorer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use ctree::parser::{parse, NodeKind};
//!
//! let outcome = parse("int main(void) { return 0; }");
//! let unit = outcome.translation_unit.unwrap();
//! assert!(outcome.diagnostics.is_empty());
//! assert_eq!(unit.children[0].kind, NodeKind::FunctionDefinition);
//! ```

pub mod config;
pub mod parser;
pub mod printer;
pub mod ui;
