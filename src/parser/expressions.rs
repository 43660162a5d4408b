//! Expression parsing implementation
//!
//! This module handles the full C expression ladder, loosest binding first.
//! The ten binary levels share one precedence-climbing loop over
//! [`BINARY_LEVELS`]; operators of one level fold left. Assignment and the
//! conditional operator recurse to the right.
//!
//! # Grammar
//!
//! ```text
//! expression       ::= assignment ("," assignment)*
//! assignment       ::= conditional | unary assign-op assignment
//! conditional      ::= logical-or ("?" expression ":" conditional)?
//! logical-or       ::= logical-and ("||" logical-and)*
//! ...                  (&&, |, ^, &, == !=, < > <= >=, << >>, + -, * / %)
//! cast             ::= "(" type-name ")" cast | unary
//! unary            ::= postfix | ("++" | "--") unary | unary-op cast
//!                    | "sizeof" unary | "sizeof" "(" type-name ")"
//! postfix          ::= primary ("[" expression "]" | "(" args? ")"
//!                    | ("." | "->") identifier | "++" | "--")*
//! primary          ::= identifier | constant | string-literal+ | "(" expression ")"
//! ```
//!
//! Parentheses are not kept as nodes; a parenthesized expression yields its
//! inner tree.
//!
//! Each rule only peeks to pick an alternative and hands the committed part
//! to a `finish_*` method, which keeps the frames on the recursive path small.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::diagnostics::ParseError;
use crate::parser::parse::{identifier_node, Committed, ParseResult, Parser};
use crate::parser::token::{Literal, TokenKind};

/// Binary operator levels, loosest first.
const BINARY_LEVELS: &[(NodeKind, &[TokenKind])] = &[
    (NodeKind::LogicalOrExpression, &[TokenKind::OrOr]),
    (NodeKind::LogicalAndExpression, &[TokenKind::AndAnd]),
    (NodeKind::InclusiveOrExpression, &[TokenKind::Pipe]),
    (NodeKind::ExclusiveOrExpression, &[TokenKind::Caret]),
    (NodeKind::AndExpression, &[TokenKind::Amp]),
    (NodeKind::EqualityExpression, &[TokenKind::EqEq, TokenKind::NotEq]),
    (
        NodeKind::RelationalExpression,
        &[TokenKind::Lt, TokenKind::Gt, TokenKind::Le, TokenKind::Ge],
    ),
    (NodeKind::ShiftExpression, &[TokenKind::LtLt, TokenKind::GtGt]),
    (NodeKind::AdditiveExpression, &[TokenKind::Plus, TokenKind::Minus]),
    (
        NodeKind::MultiplicativeExpression,
        &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    ),
];

fn binary_level(kind: TokenKind) -> Option<usize> {
    BINARY_LEVELS.iter().position(|(_, ops)| ops.contains(&kind))
}

impl Parser {
    /// Parse expression (top-level entry point, comma operator included)
    pub(crate) fn parse_expression(&mut self) -> ParseResult {
        let Some(first) = self.parse_assignment_expression()? else {
            return Ok(None);
        };
        if !self.check(TokenKind::Comma) {
            return Ok(Some(first));
        }
        self.finish_comma_expression(first).map(Some)
    }

    fn finish_comma_expression(&mut self, mut left: Node) -> Committed {
        while self.match_token(TokenKind::Comma) {
            let location = self.previous().location;
            let right = self
                .parse_assignment_expression()?
                .ok_or_else(|| ParseError::expected("an expression", "after ','", self.peek()))?;
            left = Node::binary(NodeKind::CommaExpression, ",", location, left, right);
        }
        Ok(left)
    }

    /// Parse assignment (right-associative)
    pub(crate) fn parse_assignment_expression(&mut self) -> ParseResult {
        let start = self.position;
        let Some(target) = self.parse_conditional_expression()? else {
            return Ok(None);
        };
        if !self.peek().kind.is_assignment_operator() {
            return Ok(Some(target));
        }
        self.finish_assignment(target, start).map(Some)
    }

    /// `target` covers the tokens from `start` up to the assignment operator
    /// under the cursor.
    fn finish_assignment(&mut self, target: Node, start: usize) -> Committed {
        let parenthesized = self.last_parenthesized == Some((start, self.position - 1));
        let op = self.advance().clone();
        if !target.kind.is_unary_level() && !parenthesized {
            return Err(Box::new(ParseError {
                message: format!(
                    "Expected a unary expression as the target of '{}', found {}",
                    op.lexeme, target.kind
                ),
                expected: "a unary expression".to_string(),
                location: op.location,
                found: op,
            }));
        }

        self.descend()?;
        let value = self.parse_assignment_expression()?.ok_or_else(|| {
            ParseError::expected("an expression", &format!("after '{}'", op.lexeme), self.peek())
        })?;
        self.ascend();
        Ok(Node::binary(
            NodeKind::AssignmentExpression,
            op.lexeme,
            op.location,
            target,
            value,
        ))
    }

    /// Parse the ternary operator (right-associative in its else branch)
    pub(crate) fn parse_conditional_expression(&mut self) -> ParseResult {
        let Some(condition) = self.parse_binary_expression(0)? else {
            return Ok(None);
        };
        if !self.check(TokenKind::Question) {
            return Ok(Some(condition));
        }
        self.finish_conditional(condition).map(Some)
    }

    fn finish_conditional(&mut self, condition: Node) -> Committed {
        let question = self.advance().location;
        self.descend()?;
        let then_branch = self
            .parse_expression()?
            .ok_or_else(|| ParseError::expected("an expression", "after '?'", self.peek()))?;
        self.consume(TokenKind::Colon, "in conditional expression")?;
        let else_branch = self
            .parse_conditional_expression()?
            .ok_or_else(|| ParseError::expected("an expression", "after ':'", self.peek()))?;
        self.ascend();

        Ok(Node::new(NodeKind::ConditionalExpression, question)
            .with_text("?")
            .with_children([condition, then_branch, else_branch]))
    }

    /// Constant expressions are syntactically conditional expressions.
    pub(crate) fn parse_constant_expression(&mut self) -> ParseResult {
        self.parse_conditional_expression()
    }

    /// Binary operators from `BINARY_LEVELS[min_level]` inward.
    fn parse_binary_expression(&mut self, min_level: usize) -> ParseResult {
        let Some(left) = self.parse_cast_expression()? else {
            return Ok(None);
        };
        self.fold_binary_operators(left, min_level).map(Some)
    }

    /// Operators of one level fold left; a tighter operator further right
    /// claims the right operand first. Once an operator is consumed the right
    /// operand is mandatory.
    fn fold_binary_operators(&mut self, mut left: Node, min_level: usize) -> Committed {
        while let Some(level) = binary_level(self.peek().kind).filter(|&l| l >= min_level) {
            let op = self.advance().clone();
            let right = self.parse_binary_expression(level + 1)?.ok_or_else(|| {
                ParseError::expected("an expression", &format!("after '{}'", op.lexeme), self.peek())
            })?;
            left = Node::binary(BINARY_LEVELS[level].0, op.lexeme, op.location, left, right);
        }
        Ok(left)
    }

    /// Parse `(type-name) operand`, or fall through to a unary expression
    pub(crate) fn parse_cast_expression(&mut self) -> ParseResult {
        if self.check(TokenKind::LParen) && self.starts_type_name(self.peek_nth(1)) {
            return self.finish_cast_expression().map(Some);
        }
        self.parse_unary_expression()
    }

    fn finish_cast_expression(&mut self) -> Committed {
        let open = self.advance().location;
        self.descend()?;
        let type_name = self
            .parse_type_name()?
            .ok_or_else(|| ParseError::expected("a type name", "in cast", self.peek()))?;
        self.consume(TokenKind::RParen, "after cast type")?;
        let operand = self
            .parse_cast_expression()?
            .ok_or_else(|| ParseError::expected("an expression", "after cast", self.peek()))?;
        self.ascend();
        Ok(Node::new(NodeKind::CastExpression, open).with_children([type_name, operand]))
    }

    /// Parse prefix operators and `sizeof`
    pub(crate) fn parse_unary_expression(&mut self) -> ParseResult {
        let kind = self.peek().kind;
        match kind {
            TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Amp
            | TokenKind::Star
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::Bang
            | TokenKind::Sizeof => self.finish_prefix_expression().map(Some),
            _ => self.parse_postfix_expression(),
        }
    }

    /// The operator under the cursor and its operand.
    fn finish_prefix_expression(&mut self) -> Committed {
        let op = self.advance().clone();
        self.descend()?;
        let operand = match op.kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => self.parse_unary_expression()?,
            TokenKind::Sizeof => self.parse_sizeof_operand()?,
            _ => self.parse_cast_expression()?,
        };
        let operand = operand.ok_or_else(|| {
            ParseError::expected("an expression", &format!("after '{}'", op.lexeme), self.peek())
        })?;
        self.ascend();

        Ok(Node::new(NodeKind::UnaryExpression, op.location)
            .with_text(op.lexeme)
            .with_child(operand))
    }

    /// `sizeof (type-name)` yields the type name, anything else a unary
    /// expression.
    fn parse_sizeof_operand(&mut self) -> ParseResult {
        if self.check(TokenKind::LParen) && self.starts_type_name(self.peek_nth(1)) {
            self.advance();
            let type_name = self.parse_type_name()?;
            if type_name.is_some() {
                self.consume(TokenKind::RParen, "after type name in 'sizeof'")?;
            }
            return Ok(type_name);
        }
        self.parse_unary_expression()
    }

    /// Parse postfix suffixes: subscripts, calls, member access, `++`/`--`
    pub(crate) fn parse_postfix_expression(&mut self) -> ParseResult {
        let Some(expr) = self.parse_primary_expression()? else {
            return Ok(None);
        };
        self.finish_postfix_expression(expr).map(Some)
    }

    fn finish_postfix_expression(&mut self, mut expr: Node) -> Committed {
        loop {
            let location = self.current_location();
            let kind = self.peek().kind;
            expr = match kind {
                TokenKind::LBracket => {
                    self.advance();
                    self.descend()?;
                    let index = self.parse_expression()?.ok_or_else(|| {
                        ParseError::expected("an expression", "inside '[]'", self.peek())
                    })?;
                    self.consume(TokenKind::RBracket, "after array index")?;
                    self.ascend();
                    Node::new(NodeKind::SubscriptExpression, location).with_children([expr, index])
                }
                TokenKind::LParen => {
                    self.advance();
                    self.descend()?;
                    let call = Node::new(NodeKind::CallExpression, location).with_child(expr);
                    let call = self.finish_call_arguments(call)?;
                    self.ascend();
                    call
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let op = self.advance().lexeme.clone();
                    let member = self.consume_identifier(&format!("after '{}'", op))?;
                    Node::new(NodeKind::MemberExpression, location)
                        .with_text(op)
                        .with_children([expr, member])
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = self.advance().lexeme.clone();
                    Node::new(NodeKind::PostfixExpression, location)
                        .with_text(op)
                        .with_child(expr)
                }
                _ => return Ok(expr),
            };
        }
    }

    /// Arguments after the `(` of a call, through the closing `)`.
    fn finish_call_arguments(&mut self, mut call: Node) -> Committed {
        if !self.check(TokenKind::RParen) {
            loop {
                let arg = self
                    .parse_assignment_expression()?
                    .ok_or_else(|| ParseError::expected("an argument", "in call", self.peek()))?;
                call.children.push(arg);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "after function arguments")?;
        Ok(call)
    }

    /// Parse identifiers, constants, string literals and parenthesized expressions
    pub(crate) fn parse_primary_expression(&mut self) -> ParseResult {
        let kind = self.peek().kind;
        let kind = match kind {
            TokenKind::Identifier => return Ok(Some(identifier_node(self.advance()))),
            TokenKind::IntegerConstant => NodeKind::IntegerConstant,
            TokenKind::FloatingConstant => NodeKind::FloatingConstant,
            TokenKind::CharacterConstant => NodeKind::CharacterConstant,
            TokenKind::StringLiteral => return Ok(Some(self.parse_string_literal())),
            TokenKind::LParen => return self.finish_parenthesized_expression().map(Some),
            _ => return Ok(None),
        };

        let token = self.advance();
        let node = Node::new(kind, token.location);
        Ok(Some(match token.literal.clone() {
            Some(literal) => node.with_literal(literal),
            None => node,
        }))
    }

    fn finish_parenthesized_expression(&mut self) -> Committed {
        let open = self.position;
        self.advance();
        self.descend()?;
        let inner = self
            .parse_expression()?
            .ok_or_else(|| ParseError::expected("an expression", "after '('", self.peek()))?;
        self.consume(TokenKind::RParen, "after expression")?;
        self.ascend();
        self.last_parenthesized = Some((open, self.position - 1));
        Ok(inner)
    }

    /// Adjacent string literals form a single node holding their
    /// concatenated contents.
    fn parse_string_literal(&mut self) -> Node {
        let location = self.current_location();
        let mut text = String::new();
        while self.check(TokenKind::StringLiteral) {
            if let Some(Literal::String(s)) = &self.advance().literal {
                text.push_str(s);
            }
        }
        Node::new(NodeKind::StringLiteral, location).with_literal(Literal::String(text))
    }
}
