//! C source code front end
//!
//! This module transforms C source text into a syntax tree plus diagnostics:
//! - [`token`]: token kinds, literal payloads and the token record
//! - [`lexer`]: tokenization by maximal munch (source text → tokens)
//! - [`parse`]: the parser session, cursor and recovery (tokens → tree)
//! - [`ast`]: the uniform node type and traversal
//! - [`diagnostics`]: lexical and syntax error records
//!
//! # Supported Language
//!
//! The full C89 grammar without a preprocessor: declarations with storage
//! classes, qualifiers, struct/union/enum bodies, bit-fields, pointer, array
//! and function declarators (abstract ones included), K&R definitions,
//! initializer lists, every statement form and the complete operator ladder.
//! `#` lines are skipped as trivia.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with panic-mode recovery. Malformed input
//! never aborts a parse: errors are collected as diagnostics and the parser
//! resynchronizes at the next statement or declaration boundary. Only an
//! unrecognizable character in the source is fatal.

pub mod ast;
mod declarations;
pub mod diagnostics;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod token;

pub use ast::{Node, NodeKind, SourceLocation};
pub use declarations::declarator_name;
pub use diagnostics::{Diagnostic, LexError, ParseError, Severity};
pub use lexer::{tokenize, Lexer};
pub use parse::{parse, parse_with_config, ParseOutcome, ParseResult, Parser};
pub use token::{Literal, Token, TokenKind};
