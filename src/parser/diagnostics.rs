//! Diagnostic records and the two error types of the front end
//!
//! - [`LexError`] is fatal: the lexer stops at the first position no token
//!   category matches and no token sequence is produced.
//! - [`ParseError`] is recoverable: it unwinds a grammar rule that committed
//!   to an alternative and then failed, up to the nearest recovery loop, which
//!   turns it into a [`Diagnostic`] and resynchronizes.
//!
//! Both convert into [`Diagnostic`], the single record type handed to callers.

use super::ast::SourceLocation;
use super::token::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Unrecognized input; terminates the run.
    Lexical,
    /// Malformed construct; parsing continued after recovery.
    Syntax,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Lexical => write!(f, "lexical error"),
            Severity::Syntax => write!(f, "syntax error"),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// What the grammar needed at this point, e.g. `')'`.
    pub expected: String,
    /// The offending token; absent for lexical errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<Token>,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Lexical
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}: {}",
            self.severity, self.location.line, self.location.column, self.message
        )
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        LexError {
            message: message.into(),
            location,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Lexical,
            expected: "a valid token".to_string(),
            message: self.message,
            found: None,
            location: self.location,
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        err.into_diagnostic()
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub expected: String,
    pub found: Token,
    pub location: SourceLocation,
}

impl ParseError {
    /// `"Expected <expected> <context>, found <found>"`, located at the found
    /// token.
    pub fn expected(expected: impl Into<String>, context: &str, found: &Token) -> Self {
        let expected = expected.into();
        let message = if context.is_empty() {
            format!("Expected {}, found {}", expected, found)
        } else {
            format!("Expected {} {}, found {}", expected, context, found)
        };
        ParseError {
            message,
            expected,
            found: found.clone(),
            location: found.location,
        }
    }

    /// The parser refused to descend past `limit` nested constructs.
    pub fn nesting_too_deep(limit: usize, found: &Token) -> Self {
        ParseError {
            message: format!("Nesting exceeds the maximum depth of {}, found {}", limit, found),
            expected: format!("at most {} nested constructs", limit),
            found: found.clone(),
            location: found.location,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Syntax,
            message: self.message,
            expected: self.expected,
            found: Some(self.found),
            location: self.location,
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        err.into_diagnostic()
    }
}
