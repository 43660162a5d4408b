//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Labeled: `name:`, `case 1:`, `default:`
//! - Compound: `{ ... }` with declarations and statements in any order
//! - Expression statements, including the empty statement `;`
//! - Selection: `if`/`else`, `switch`
//! - Iteration: `while`, `do`/`while`, `for`
//! - Jump: `goto`, `continue`, `break`, `return`
//!
//! # Grammar
//!
//! ```text
//! statement ::= labeled | compound | expression-stmt
//!             | selection | iteration | jump
//! compound  ::= "{" (declaration | statement)* "}"
//! ```
//!
//! The block-item loop of a compound statement is a recovery point: a
//! malformed item is reported, the parser resynchronizes, and the block
//! carries on with the next item.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::diagnostics::ParseError;
use crate::parser::parse::{Committed, ParseResult, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a statement. Every statement opens a nesting level, so nested
    /// bodies and blocks count against `Config::max_nesting`.
    pub(crate) fn parse_statement(&mut self) -> ParseResult {
        self.descend()?;
        let statement = self.parse_statement_body()?;
        self.ascend();
        Ok(statement)
    }

    fn parse_statement_body(&mut self) -> ParseResult {
        let kind = self.peek().kind;

        let statement = match kind {
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Colon => {
                self.parse_labeled_statement()?
            }
            TokenKind::Case | TokenKind::Default => self.parse_labeled_statement()?,
            TokenKind::LBrace => return self.parse_compound_statement(),
            TokenKind::If | TokenKind::Switch => self.parse_selection_statement()?,
            TokenKind::While | TokenKind::Do | TokenKind::For => self.parse_iteration_statement()?,
            TokenKind::Goto | TokenKind::Continue | TokenKind::Break | TokenKind::Return => {
                self.parse_jump_statement()?
            }
            _ => return self.parse_expression_statement(),
        };

        Ok(Some(statement))
    }

    /// A statement is mandatory here
    fn require_statement(&mut self, context: &str) -> Committed {
        Ok(self.parse_statement()?
            .ok_or_else(|| ParseError::expected("a statement", context, self.peek()))?)
    }

    fn parse_labeled_statement(&mut self) -> Committed {
        let token = self.advance().clone();

        let mut labeled = Node::new(NodeKind::LabeledStatement, token.location)
            .with_text(token.lexeme.clone());
        match token.kind {
            TokenKind::Case => {
                let value = self.parse_constant_expression()?.ok_or_else(|| {
                    ParseError::expected("a constant expression", "after 'case'", self.peek())
                })?;
                self.consume(TokenKind::Colon, "after case value")?;
                labeled.children.push(value);
            }
            TokenKind::Default => {
                self.consume(TokenKind::Colon, "after 'default'")?;
            }
            _ => {
                self.consume(TokenKind::Colon, "after label")?;
            }
        }

        let body = self.require_statement(&format!("after label '{}'", token.lexeme))?;
        labeled.children.push(body);
        Ok(labeled)
    }

    /// Parse `{ block-item* }`. Returns `None` if the current token is not `{`.
    pub(crate) fn parse_compound_statement(&mut self) -> ParseResult {
        if !self.check(TokenKind::LBrace) {
            return Ok(None);
        }
        let open = self.advance().location;
        let mut block = Node::new(NodeKind::CompoundStatement, open);

        while !self.check(TokenKind::RBrace) && !self.is_at_end() && !self.halted {
            let start = self.checkpoint();
            match self.parse_block_item() {
                Ok(Some(item)) => block.children.push(item),
                Ok(None) => {
                    let err =
                        ParseError::expected("a declaration or statement", "in block", self.peek());
                    self.recover(err, start);
                }
                Err(err) => self.recover(*err, start),
            }
        }

        if self.halted {
            return Ok(Some(block));
        }
        self.consume(TokenKind::RBrace, "to close the block")?;
        Ok(Some(block))
    }

    fn parse_block_item(&mut self) -> ParseResult {
        if self.at_declaration_start() {
            self.parse_declaration()
        } else {
            self.parse_statement()
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult {
        let location = self.current_location();
        if self.match_token(TokenKind::Semicolon) {
            return Ok(Some(Node::new(NodeKind::ExpressionStatement, location)));
        }

        let Some(expression) = self.parse_expression()? else {
            return Ok(None);
        };
        self.consume(TokenKind::Semicolon, "after expression")?;
        Ok(Some(Node::new(NodeKind::ExpressionStatement, location).with_child(expression)))
    }

    /// Parse `if (...) stmt [else stmt]` or `switch (...) stmt`
    fn parse_selection_statement(&mut self) -> Committed {
        let keyword = self.advance().clone();
        let condition = self.parse_parenthesized_condition(&keyword.lexeme)?;
        let body = self.require_statement(&format!("after '{}' condition", keyword.lexeme))?;

        let mut selection = Node::new(NodeKind::SelectionStatement, keyword.location)
            .with_text(keyword.lexeme)
            .with_children([condition, body]);

        // A dangling else binds to the nearest if
        if keyword.kind == TokenKind::If && self.match_token(TokenKind::Else) {
            let else_branch = self.require_statement("after 'else'")?;
            selection.children.push(else_branch);
        }

        Ok(selection)
    }

    fn parse_iteration_statement(&mut self) -> Committed {
        let keyword = self.advance().clone();
        let iteration = Node::new(NodeKind::IterationStatement, keyword.location)
            .with_text(keyword.lexeme.clone());

        let children = match keyword.kind {
            TokenKind::While => {
                let condition = self.parse_parenthesized_condition("while")?;
                let body = self.require_statement("after 'while' condition")?;
                vec![condition, body]
            }
            TokenKind::Do => {
                let body = self.require_statement("after 'do'")?;
                self.consume(TokenKind::While, "after 'do' body")?;
                let condition = self.parse_parenthesized_condition("while")?;
                self.consume(TokenKind::Semicolon, "after 'do-while' condition")?;
                vec![body, condition]
            }
            _ => {
                self.consume(TokenKind::LParen, "after 'for'")?;
                let init = if self.at_declaration_start() {
                    self.parse_declaration()?.ok_or_else(|| {
                        ParseError::expected("a declaration", "in 'for' initializer", self.peek())
                    })?
                } else {
                    self.parse_for_clause(TokenKind::Semicolon, "after 'for' initializer")?
                };
                let condition = self.parse_for_clause(TokenKind::Semicolon, "after 'for' condition")?;
                let step = self.parse_for_clause(TokenKind::RParen, "after 'for' clauses")?;
                let body = self.require_statement("after 'for' clauses")?;
                vec![init, condition, step, body]
            }
        };

        Ok(iteration.with_children(children))
    }

    /// One `for` header clause as an expression statement, empty if omitted
    fn parse_for_clause(&mut self, terminator: TokenKind, context: &str) -> Committed {
        let mut clause = Node::new(NodeKind::ExpressionStatement, self.current_location());
        if let Some(expression) = self.parse_expression()? {
            clause.children.push(expression);
        }
        self.consume(terminator, context)?;
        Ok(clause)
    }

    fn parse_parenthesized_condition(&mut self, keyword: &str) -> Committed {
        self.consume(TokenKind::LParen, &format!("after '{}'", keyword))?;
        let condition = self.parse_expression()?.ok_or_else(|| {
            ParseError::expected("an expression", &format!("in '{}' condition", keyword), self.peek())
        })?;
        self.consume(TokenKind::RParen, &format!("after '{}' condition", keyword))?;
        Ok(condition)
    }

    fn parse_jump_statement(&mut self) -> Committed {
        let keyword = self.advance().clone();
        let mut jump =
            Node::new(NodeKind::JumpStatement, keyword.location).with_text(keyword.lexeme.clone());

        match keyword.kind {
            TokenKind::Goto => {
                let label = self.consume_identifier("after 'goto'")?;
                jump.children.push(label);
            }
            TokenKind::Return => {
                if let Some(value) = self.parse_expression()? {
                    jump.children.push(value);
                }
            }
            _ => {}
        }

        self.consume(TokenKind::Semicolon, &format!("after '{}'", keyword.lexeme))?;
        Ok(jump)
    }
}
