//! Main parser coordinator
//!
//! This module provides the [`Parser`] session: the token cursor, the
//! diagnostic sink, panic-mode recovery, and the translation-unit loop that
//! drives a whole parse.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, cursor primitives, recovery and entry points
//! - `declarations`: external declarations, specifiers, declarators, initializers
//! - `statements`: labeled, compound, selection, iteration and jump statements
//! - `expressions`: the precedence ladder from comma down to primary
//!
//! # Failure contract
//!
//! Every grammar rule returns [`ParseResult`]:
//! - `Ok(Some(node))`: the rule matched.
//! - `Ok(None)`: the rule did not match and consumed nothing; the caller may
//!   try another alternative.
//! - `Err(Box<ParseError>)`: the rule committed (consumed a distinguishing token) and
//!   then hit something malformed. The error unwinds with `?` to the nearest
//!   recovery loop (translation unit or block), which records it as a
//!   [`Diagnostic`] and calls [`Parser::synchronize`].
//!
//! The error is boxed so the results threaded through every rule stay one
//! pointer wide on the error side.
//!
//! # Nesting
//!
//! Rules that recurse on nested input (parenthesized expressions, casts,
//! prefix operators, blocks, declarators, initializer lists) enter a nesting
//! level first. Past [`Config::max_nesting`] levels the rule fails with a
//! `ParseError` instead of recursing, so adversarial input cannot exhaust the
//! stack.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::config::Config;
use crate::parser::ast::*;
use crate::parser::diagnostics::{Diagnostic, LexError, ParseError};
use crate::parser::lexer::Lexer;
use crate::parser::token::{Token, TokenKind};
use log::{debug, trace};
use rustc_hash::FxHashSet;

/// Result of a grammar rule; see the module docs for the three outcomes.
pub type ParseResult<T = Node> = Result<Option<T>, Box<ParseError>>;

/// Result of a rule that has already committed.
pub(crate) type Committed<T = Node> = Result<T, Box<ParseError>>;

/// Parser state a recovery loop rewinds its bookkeeping to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    position: usize,
    depth: usize,
}

/// Everything a parse run hands back to its caller.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// `None` only when tokenization failed.
    pub translation_unit: Option<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// No diagnostics of any kind.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Tokenize and parse `source` as one translation unit.
pub fn parse(source: &str) -> ParseOutcome {
    parse_with_config(source, &Config::default())
}

pub fn parse_with_config(source: &str, config: &Config) -> ParseOutcome {
    match Parser::with_config(source, config.clone()) {
        Ok(mut parser) => {
            let unit = parser.parse_translation_unit();
            ParseOutcome {
                translation_unit: Some(unit),
                diagnostics: parser.into_diagnostics(),
            }
        }
        Err(err) => ParseOutcome {
            translation_unit: None,
            diagnostics: vec![err.into_diagnostic()],
        },
    }
}

/// Recursive descent parser session for one translation unit
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) typedef_names: FxHashSet<String>,
    pub(crate) config: Config,
    /// Token span `(open, close)` of the most recently closed parenthesized
    /// primary expression.
    pub(crate) last_parenthesized: Option<(usize, usize)>,
    /// Set once the error budget is spent; recovery loops stop.
    pub(crate) halted: bool,
    /// Nesting levels currently entered.
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, LexError> {
        Self::with_config(source, Config::default())
    }

    pub fn with_config(source: &str, config: Config) -> Result<Self, LexError> {
        let tokens = Lexer::with_config(source, &config).tokenize()?;
        Ok(Self::from_tokens(tokens, config))
    }

    /// Build a session over an existing token sequence. An end-of-file token
    /// is appended if the sequence does not already end with one.
    pub fn from_tokens(mut tokens: Vec<Token>, config: Config) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let loc = tokens
                .last()
                .map(|t| t.location)
                .unwrap_or(SourceLocation::new(1, 1));
            tokens.push(Token::eof(loc));
        }
        Self {
            tokens,
            position: 0,
            diagnostics: Vec::new(),
            typedef_names: FxHashSet::default(),
            config,
            last_parenthesized: None,
            halted: false,
            depth: 0,
        }
    }

    /// Parse the entire program (top-level declarations)
    ///
    /// Always yields a translation-unit node; malformed external declarations
    /// are reported as diagnostics and skipped.
    pub fn parse_translation_unit(&mut self) -> Node {
        let mut unit = Node::new(NodeKind::TranslationUnit, self.current_location());

        while !self.is_at_end() && !self.halted {
            let start = self.checkpoint();
            match self.parse_external_declaration() {
                Ok(Some(decl)) => unit.children.push(decl),
                Ok(None) => {
                    let err = ParseError::expected(
                        "a declaration or function definition",
                        "",
                        self.peek(),
                    );
                    self.recover(err, start);
                }
                Err(err) => self.recover(*err, start),
            }
        }

        debug!(
            "parsed {} external declarations with {} diagnostics",
            unit.children.len(),
            self.diagnostics.len()
        );
        unit
    }

    /// Parse the whole input as a single expression. Returns `None` (with a
    /// diagnostic) if it is malformed.
    pub fn parse_standalone_expression(&mut self) -> Option<Node> {
        let start = self.checkpoint();
        match self.parse_expression() {
            Ok(Some(expr)) => {
                self.expect_end("after expression");
                Some(expr)
            }
            Ok(None) => {
                let err = ParseError::expected("an expression", "", self.peek());
                self.recover(err, start);
                None
            }
            Err(err) => {
                self.recover(*err, start);
                None
            }
        }
    }

    /// Parse the whole input as a single statement.
    pub fn parse_standalone_statement(&mut self) -> Option<Node> {
        let start = self.checkpoint();
        match self.parse_statement() {
            Ok(Some(stmt)) => {
                self.expect_end("after statement");
                Some(stmt)
            }
            Ok(None) => {
                let err = ParseError::expected("a statement", "", self.peek());
                self.recover(err, start);
                None
            }
            Err(err) => {
                self.recover(*err, start);
                None
            }
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    // ===== Diagnostics and recovery =====

    /// Record a diagnostic without interrupting the parse.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
        if self.config.error_budget_spent(self.diagnostics.len()) {
            debug!("error budget spent, halting");
            self.halted = true;
        }
    }

    /// Discard tokens until a plausible statement or declaration boundary:
    /// just past a `;`, or at a declaration/statement keyword, a `}`, or end
    /// of file. Never moves backwards.
    pub fn synchronize(&mut self) {
        let from = self.current_location();

        while !self.is_at_end() {
            let token = self.peek();
            if token.kind == TokenKind::Semicolon {
                self.advance();
                break;
            }
            if token.kind == TokenKind::RBrace
                || token.kind.starts_declaration()
                || token.kind.starts_statement()
                || self.is_typedef_name(token)
            {
                break;
            }
            self.advance();
        }

        trace!("synchronized from {} to {}", from, self.current_location());
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            depth: self.depth,
        }
    }

    /// Record `err`, resynchronize, and guarantee progress relative to
    /// `start` so a recovery loop cannot spin on the same token. Nesting
    /// levels abandoned by the unwinding rules are released.
    pub(crate) fn recover(&mut self, err: ParseError, start: Checkpoint) {
        self.depth = start.depth;
        self.add_diagnostic(err.into_diagnostic());
        self.synchronize();
        if self.position == start.position && !self.is_at_end() {
            self.advance();
        }
    }

    // ===== Nesting =====

    /// Enter one nesting level, or fail once `Config::max_nesting` levels
    /// are open. Pair with [`Parser::ascend`] on the success path; error
    /// paths are rebalanced by [`Parser::recover`].
    pub(crate) fn descend(&mut self) -> Committed<()> {
        if self.depth >= self.config.max_nesting {
            trace!("nesting limit {} reached at {}", self.config.max_nesting, self.current_location());
            return Err(Box::new(ParseError::nesting_too_deep(
                self.config.max_nesting,
                self.peek(),
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn expect_end(&mut self, context: &str) {
        if !self.is_at_end() {
            let err = ParseError::expected("end of input", context, self.peek());
            self.add_diagnostic(err.into_diagnostic());
        }
    }

    // ===== Typedef names =====

    pub(crate) fn register_typedef(&mut self, name: &str) {
        trace!("typedef name '{}'", name);
        self.typedef_names.insert(name.to_string());
    }

    pub(crate) fn is_typedef_name(&self, token: &Token) -> bool {
        token.kind == TokenKind::Identifier && self.typedef_names.contains(&token.lexeme)
    }

    /// The token can begin a type name (specifier, qualifier or typedef name).
    pub(crate) fn starts_type_name(&self, token: &Token) -> bool {
        token.kind.is_type_specifier()
            || token.kind.is_type_qualifier()
            || self.is_typedef_name(token)
    }

    /// The current token begins a declaration rather than a statement.
    pub(crate) fn at_declaration_start(&self) -> bool {
        let token = self.peek();
        token.kind.starts_declaration()
            || (self.is_typedef_name(token) && self.peek_nth(1).kind != TokenKind::Colon)
    }

    // ===== Cursor primitives =====

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.contains(&self.peek().kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Token `n` places ahead, clamped to the end-of-file token.
    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.position + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Last consumed token; the first token if nothing was consumed yet.
    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Consume a token of `kind` or fail with "Expected <kind> <context>".
    pub(crate) fn consume(&mut self, kind: TokenKind, context: &str) -> Committed<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(Box::new(ParseError::expected(kind.to_string(), context, self.peek())))
        }
    }

    /// Consume an identifier if present, as an identifier node.
    pub(crate) fn match_identifier(&mut self) -> Option<Node> {
        if self.check(TokenKind::Identifier) {
            Some(identifier_node(self.advance()))
        } else {
            None
        }
    }

    pub(crate) fn consume_identifier(&mut self, context: &str) -> Committed {
        let token = self.consume(TokenKind::Identifier, context)?;
        Ok(identifier_node(&token))
    }
}

pub(crate) fn identifier_node(token: &Token) -> Node {
    Node::new(NodeKind::Identifier, token.location).with_text(token.lexeme.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::diagnostics::Severity;

    #[test]
    fn test_parse_simple_function() {
        let mut parser = Parser::new("int main() { return 0; }").unwrap();
        let unit = parser.parse_translation_unit();

        assert!(parser.diagnostics().is_empty());
        assert_eq!(unit.kind, NodeKind::TranslationUnit);
        assert_eq!(unit.children.len(), 1);
        assert_eq!(unit.children[0].kind, NodeKind::FunctionDefinition);
    }

    #[test]
    fn test_empty_input_is_an_empty_unit() {
        let outcome = parse("");
        let unit = outcome.translation_unit.unwrap();
        assert_eq!(unit.kind, NodeKind::TranslationUnit);
        assert!(unit.children.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_lexical_error_yields_no_tree() {
        let outcome = parse("int x = @;");
        assert!(outcome.translation_unit.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].severity, Severity::Lexical);
    }

    #[test]
    fn test_cursor_primitives() {
        let mut parser = Parser::new("a + b").unwrap();
        assert!(parser.check(TokenKind::Identifier));
        assert_eq!(parser.peek_nth(1).kind, TokenKind::Plus);
        assert_eq!(parser.peek_nth(10).kind, TokenKind::Eof);

        assert!(!parser.match_token(TokenKind::Plus));
        assert_eq!(parser.position, 0);

        assert!(parser.match_any(&[TokenKind::Plus, TokenKind::Identifier]));
        assert_eq!(parser.previous().lexeme, "a");

        let err = parser.consume(TokenKind::Minus, "in test").unwrap_err();
        assert_eq!(err.found.kind, TokenKind::Plus);
        assert_eq!(parser.position, 1);
    }

    #[test]
    fn test_synchronize_stops_after_semicolon() {
        let mut parser = Parser::new("x y z ; w").unwrap();
        parser.synchronize();
        assert_eq!(parser.peek().lexeme, "w");
    }

    #[test]
    fn test_synchronize_stops_before_keyword() {
        let mut parser = Parser::new("x y while (1);").unwrap();
        parser.synchronize();
        assert_eq!(parser.peek().kind, TokenKind::While);
    }

    #[test]
    fn test_error_budget_halts() {
        let config = Config::new().with_max_errors(Some(1));
        let outcome = parse_with_config("int 1; int 2; int 3;", &config);
        assert_eq!(outcome.diagnostics.len(), 1);
    }
}
