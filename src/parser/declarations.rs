//! Declaration parsing implementation
//!
//! This module handles external declarations, function definitions, and every
//! piece of a declaration: specifiers, struct/union/enum bodies, declarators
//! (named and abstract), parameter lists, initializers and type names.
//!
//! # Grammar
//!
//! ```text
//! external-declaration ::= function-definition | declaration
//! function-definition  ::= specifiers? declarator declaration* compound-statement
//! declaration          ::= specifiers (init-declarator ("," init-declarator)*)? ";"
//! init-declarator      ::= declarator ("=" initializer)?
//! declarator           ::= "*" qualifier* declarator | direct-declarator
//! direct-declarator    ::= (identifier | "(" declarator ")")
//!                          ("[" constant? "]" | "(" parameters? ")")*
//! parameters           ::= parameter ("," parameter)* ("," "...")? | identifier-list
//! initializer          ::= assignment | "{" initializer ("," initializer)* ","? "}"
//! type-name            ::= specifiers abstract-declarator?
//! ```
//!
//! A function definition is told apart from a declaration after the first
//! declarator: a following `{`, or a K&R declaration list after a function
//! declarator, commits to a definition.
//!
//! Names declared with `typedef` are recorded as they are parsed and are
//! afterwards accepted as type specifiers.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::diagnostics::ParseError;
use crate::parser::parse::{identifier_node, Committed, ParseResult, Parser};
use crate::parser::token::TokenKind;

/// Which declarator shapes are acceptable at this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaratorMode {
    /// Must name something: declarations and definitions.
    Named,
    /// Must not name anything: type names.
    Abstract,
    /// Parameters accept both.
    Either,
}

impl Parser {
    /// Parse a top-level declaration or function definition
    pub(crate) fn parse_external_declaration(&mut self) -> ParseResult {
        let location = self.current_location();
        let specifiers = self.parse_declaration_specifiers()?;
        let has_specifiers = specifiers.is_some();

        if has_specifiers && self.check(TokenKind::Semicolon) {
            // `struct tag { ... };` and friends declare no object
            self.advance();
            return Ok(Some(Node::new(NodeKind::Declaration, location).with_children(specifiers)));
        }

        let declarator = match self.parse_declarator()? {
            Some(declarator) => declarator,
            None if has_specifiers => {
                return Err(Box::new(ParseError::expected(
                    "a declarator",
                    "after declaration specifiers",
                    self.peek(),
                )))
            }
            None => return Ok(None),
        };
        let specifiers =
            specifiers.unwrap_or_else(|| Node::new(NodeKind::DeclarationSpecifiers, location));

        let is_definition = self.check(TokenKind::LBrace)
            || (is_function_declarator(&declarator) && self.at_declaration_start());
        if is_definition {
            return self
                .finish_function_definition(location, specifiers, declarator)
                .map(Some);
        }
        if !has_specifiers {
            // Without specifiers only a definition is possible (`main() { }`)
            return Err(Box::new(ParseError::expected(
                "'{'",
                "to open the function body",
                self.peek(),
            )));
        }

        self.finish_declaration(location, specifiers, declarator).map(Some)
    }

    fn finish_function_definition(
        &mut self,
        location: SourceLocation,
        specifiers: Node,
        declarator: Node,
    ) -> Committed {
        let mut definition = Node::new(NodeKind::FunctionDefinition, location)
            .with_child(specifiers)
            .with_child(declarator);

        // K&R parameter declarations
        while !self.check(TokenKind::LBrace) {
            match self.parse_declaration()? {
                Some(declaration) => definition.children.push(declaration),
                None => break,
            }
        }

        let body = self.parse_compound_statement()?.ok_or_else(|| {
            ParseError::expected("'{'", "to open the function body", self.peek())
        })?;
        definition.children.push(body);
        Ok(definition)
    }

    /// Parse a declaration in block scope, a K&R list or a `for` initializer
    pub(crate) fn parse_declaration(&mut self) -> ParseResult {
        let location = self.current_location();
        let Some(specifiers) = self.parse_declaration_specifiers()? else {
            return Ok(None);
        };

        if self.match_token(TokenKind::Semicolon) {
            return Ok(Some(Node::new(NodeKind::Declaration, location).with_child(specifiers)));
        }

        let first = self.parse_declarator()?.ok_or_else(|| {
            ParseError::expected("a declarator", "after declaration specifiers", self.peek())
        })?;
        self.finish_declaration(location, specifiers, first).map(Some)
    }

    /// Parse the rest of a declaration once its first declarator is known
    fn finish_declaration(
        &mut self,
        location: SourceLocation,
        specifiers: Node,
        first: Node,
    ) -> Committed {
        let is_typedef = specifiers.children.iter().any(|s| {
            s.kind == NodeKind::StorageClassSpecifier && s.text() == Some("typedef")
        });
        let mut declaration = Node::new(NodeKind::Declaration, location).with_child(specifiers);

        let mut declarator = first;
        loop {
            if is_typedef {
                if let Some(name) = declarator_name(&declarator) {
                    let name = name.to_string();
                    self.register_typedef(&name);
                }
            }
            let init_declarator = self.finish_init_declarator(declarator)?;
            declaration.children.push(init_declarator);

            if !self.match_token(TokenKind::Comma) {
                break;
            }
            declarator = self.parse_declarator()?.ok_or_else(|| {
                ParseError::expected("a declarator", "after ','", self.peek())
            })?;
        }

        self.consume(TokenKind::Semicolon, "after declaration")?;
        Ok(declaration)
    }

    fn finish_init_declarator(&mut self, declarator: Node) -> Committed {
        let mut node = Node::new(NodeKind::InitDeclarator, declarator.location).with_child(declarator);
        if self.match_token(TokenKind::Eq) {
            let initializer = self.parse_initializer()?.ok_or_else(|| {
                ParseError::expected("an initializer", "after '='", self.peek())
            })?;
            node = node.with_text("=").with_child(initializer);
        }
        Ok(node)
    }

    /// Parse storage classes, type specifiers and qualifiers in any order.
    /// Returns `None` if there are none.
    pub(crate) fn parse_declaration_specifiers(&mut self) -> ParseResult {
        let mut specifiers = Node::new(NodeKind::DeclarationSpecifiers, self.current_location());
        let mut seen_type = false;

        loop {
            let token = self.peek().clone();
            let kind = token.kind;

            let specifier = if kind.is_storage_class() {
                self.advance();
                Node::new(NodeKind::StorageClassSpecifier, token.location).with_text(token.lexeme)
            } else if kind.is_type_qualifier() {
                self.advance();
                Node::new(NodeKind::TypeQualifier, token.location).with_text(token.lexeme)
            } else if matches!(kind, TokenKind::Struct | TokenKind::Union) {
                seen_type = true;
                self.parse_struct_or_union_specifier()?
            } else if kind == TokenKind::Enum {
                seen_type = true;
                self.parse_enum_specifier()?
            } else if kind.is_type_specifier() || (!seen_type && self.is_typedef_name(&token)) {
                seen_type = true;
                self.advance();
                Node::new(NodeKind::TypeSpecifier, token.location).with_text(token.lexeme)
            } else {
                break;
            };
            specifiers.children.push(specifier);
        }

        Ok(if specifiers.children.is_empty() {
            None
        } else {
            Some(specifiers)
        })
    }

    fn parse_struct_or_union_specifier(&mut self) -> Committed {
        let keyword = self.advance().clone();
        let mut node =
            Node::new(NodeKind::StructOrUnionSpecifier, keyword.location).with_text(keyword.lexeme.clone());
        node.children.extend(self.match_identifier());

        if self.match_token(TokenKind::LBrace) {
            self.descend()?;
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                let member = self.parse_struct_declaration()?;
                node.children.push(member);
            }
            self.consume(TokenKind::RBrace, &format!("to close '{}' body", keyword.lexeme))?;
            self.ascend();
        } else if node.children.is_empty() {
            return Err(Box::new(ParseError::expected(
                "a tag name or '{'",
                &format!("after '{}'", keyword.lexeme),
                self.peek(),
            )));
        }

        Ok(node)
    }

    fn parse_struct_declaration(&mut self) -> Committed {
        let location = self.current_location();
        let specifiers = self.parse_declaration_specifiers()?.ok_or_else(|| {
            ParseError::expected("a member declaration", "in struct body", self.peek())
        })?;
        let mut node = Node::new(NodeKind::StructDeclaration, location).with_child(specifiers);

        if !self.check(TokenKind::Semicolon) {
            loop {
                let member = self.parse_struct_declarator()?;
                node.children.push(member);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::Semicolon, "after struct member")?;
        Ok(node)
    }

    /// A member declarator, optionally a bit-field `declarator? : width`
    fn parse_struct_declarator(&mut self) -> Committed {
        let location = self.current_location();
        let declarator = self.parse_declarator()?;

        if self.match_token(TokenKind::Colon) {
            let width = self.parse_constant_expression()?.ok_or_else(|| {
                ParseError::expected("a bit-field width", "after ':'", self.peek())
            })?;
            return Ok(Node::new(NodeKind::InitDeclarator, location)
                .with_text(":")
                .with_children(declarator)
                .with_child(width));
        }

        declarator.ok_or_else(|| {
            Box::new(ParseError::expected("a member declarator", "in struct body", self.peek()))
        })
    }

    fn parse_enum_specifier(&mut self) -> Committed {
        let keyword = self.advance().location;
        let mut node = Node::new(NodeKind::EnumSpecifier, keyword).with_text("enum");
        node.children.extend(self.match_identifier());

        if self.match_token(TokenKind::LBrace) {
            loop {
                let name = self.consume(TokenKind::Identifier, "in enumerator list")?;
                let mut constant =
                    Node::new(NodeKind::EnumerationConstant, name.location).with_text(name.lexeme);
                if self.match_token(TokenKind::Eq) {
                    let value = self.parse_constant_expression()?.ok_or_else(|| {
                        ParseError::expected("a constant expression", "after '='", self.peek())
                    })?;
                    constant.children.push(value);
                }
                node.children.push(constant);
                // A trailing comma before `}` is accepted
                if !self.match_token(TokenKind::Comma) || self.check(TokenKind::RBrace) {
                    break;
                }
            }
            self.consume(TokenKind::RBrace, "to close enumerator list")?;
        } else if node.children.is_empty() {
            return Err(Box::new(ParseError::expected(
                "a tag name or '{'",
                "after 'enum'",
                self.peek(),
            )));
        }

        Ok(node)
    }

    /// Parse a declarator that names something
    pub(crate) fn parse_declarator(&mut self) -> ParseResult {
        self.parse_declarator_with(DeclaratorMode::Named)
    }

    /// Each declarator level opens a nesting level.
    fn parse_declarator_with(&mut self, mode: DeclaratorMode) -> ParseResult {
        self.descend()?;
        let declarator = if self.check(TokenKind::Star) {
            Some(self.finish_pointer_declarator(mode)?)
        } else {
            self.parse_direct_declarator(mode)?
        };
        self.ascend();
        Ok(declarator)
    }

    /// `*` and its qualifiers, then the declarator they apply to.
    fn finish_pointer_declarator(&mut self, mode: DeclaratorMode) -> Committed {
        let star = self.advance().location;
        let mut pointer = Node::new(NodeKind::PointerDeclarator, star).with_text("*");
        while self.peek().kind.is_type_qualifier() {
            let qualifier = self.advance();
            let node = Node::new(NodeKind::TypeQualifier, qualifier.location)
                .with_text(qualifier.lexeme.clone());
            pointer.children.push(node);
        }

        match self.parse_declarator_with(mode)? {
            Some(inner) => pointer.children.push(inner),
            None if mode == DeclaratorMode::Named => {
                return Err(Box::new(ParseError::expected("a declarator", "after '*'", self.peek())))
            }
            None => {}
        }
        Ok(pointer)
    }

    fn parse_direct_declarator(&mut self, mode: DeclaratorMode) -> ParseResult {
        let mut declarator = if mode != DeclaratorMode::Abstract && self.check(TokenKind::Identifier) {
            Some(identifier_node(self.advance()))
        } else if self.check(TokenKind::LParen) && self.paren_opens_declarator(mode) {
            self.advance();
            let inner = self.parse_declarator_with(mode)?.ok_or_else(|| {
                ParseError::expected("a declarator", "after '('", self.peek())
            })?;
            self.consume(TokenKind::RParen, "to close the declarator")?;
            Some(inner)
        } else if mode == DeclaratorMode::Named {
            return Ok(None);
        } else {
            None
        };

        loop {
            let open = self.peek().location;
            if self.match_token(TokenKind::LBracket) {
                let mut array = Node::new(NodeKind::ArrayDeclarator, open);
                match declarator.take() {
                    Some(inner) => array.children.push(inner),
                    None => array = array.with_text("abstract"),
                }
                if !self.check(TokenKind::RBracket) {
                    let size = self.parse_constant_expression()?.ok_or_else(|| {
                        ParseError::expected("an array size", "inside '[]'", self.peek())
                    })?;
                    array.children.push(size);
                }
                self.consume(TokenKind::RBracket, "after array size")?;
                declarator = Some(array);
            } else if self.check(TokenKind::LParen)
                && (declarator.is_some() || mode != DeclaratorMode::Named)
            {
                self.advance();
                let mut function = Node::new(NodeKind::FunctionDeclarator, open);
                match declarator.take() {
                    Some(inner) => function.children.push(inner),
                    None => function = function.with_text("abstract"),
                }
                let parameters = self.parse_parameters(open)?;
                function.children.push(parameters);
                self.consume(TokenKind::RParen, "after parameter list")?;
                declarator = Some(function);
            } else {
                break;
            }
        }

        Ok(declarator)
    }

    /// In abstract position a `(` either wraps a nested declarator or opens
    /// a parameter list; decide from the token after it.
    fn paren_opens_declarator(&self, mode: DeclaratorMode) -> bool {
        let next = self.peek_nth(1);
        match mode {
            DeclaratorMode::Named => true,
            _ if matches!(next.kind, TokenKind::Star | TokenKind::LParen | TokenKind::LBracket) => true,
            DeclaratorMode::Either => next.kind == TokenKind::Identifier && !self.is_typedef_name(next),
            DeclaratorMode::Abstract => false,
        }
    }

    /// Parameter type list, K&R identifier list, or nothing (`()`)
    fn parse_parameters(&mut self, location: SourceLocation) -> Committed {
        if self.check(TokenKind::RParen) {
            return Ok(Node::new(NodeKind::ParameterList, location));
        }

        if self.check(TokenKind::Identifier) && !self.is_typedef_name(self.peek()) {
            let mut identifiers = Node::new(NodeKind::IdentifierList, location);
            loop {
                let name = self.consume_identifier("in identifier list")?;
                identifiers.children.push(name);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            return Ok(identifiers);
        }

        let mut parameters = Node::new(NodeKind::ParameterList, location);
        loop {
            if self.check(TokenKind::Ellipsis) {
                let ellipsis = self.advance().location;
                parameters
                    .children
                    .push(Node::new(NodeKind::Ellipsis, ellipsis).with_text("..."));
                break;
            }
            let parameter = self.parse_parameter_declaration()?.ok_or_else(|| {
                ParseError::expected("a parameter declaration", "in parameter list", self.peek())
            })?;
            parameters.children.push(parameter);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(parameters)
    }

    fn parse_parameter_declaration(&mut self) -> ParseResult {
        let location = self.current_location();
        let Some(specifiers) = self.parse_declaration_specifiers()? else {
            return Ok(None);
        };
        let declarator = self.parse_declarator_with(DeclaratorMode::Either)?;
        Ok(Some(
            Node::new(NodeKind::ParameterDeclaration, location)
                .with_child(specifiers)
                .with_children(declarator),
        ))
    }

    /// Parse a type name as used by casts and `sizeof`
    pub(crate) fn parse_type_name(&mut self) -> ParseResult {
        let location = self.current_location();
        let Some(specifiers) = self.parse_declaration_specifiers()? else {
            return Ok(None);
        };
        let declarator = self.parse_declarator_with(DeclaratorMode::Abstract)?;
        Ok(Some(
            Node::new(NodeKind::TypeName, location)
                .with_child(specifiers)
                .with_children(declarator),
        ))
    }

    /// Parse an expression initializer or a braced initializer list
    pub(crate) fn parse_initializer(&mut self) -> ParseResult {
        if !self.check(TokenKind::LBrace) {
            return self.parse_assignment_expression();
        }

        let open = self.advance().location;
        self.descend()?;
        let mut list = Node::new(NodeKind::InitializerList, open);
        while !self.check(TokenKind::RBrace) {
            let item = self.parse_initializer()?.ok_or_else(|| {
                ParseError::expected("an initializer", "in initializer list", self.peek())
            })?;
            list.children.push(item);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "to close initializer list")?;
        self.ascend();
        Ok(Some(list))
    }
}

/// Name introduced by a declarator, if it has one.
pub fn declarator_name(declarator: &Node) -> Option<&str> {
    match declarator.kind {
        NodeKind::Identifier => declarator.text(),
        NodeKind::PointerDeclarator => declarator
            .children
            .last()
            .filter(|inner| inner.kind != NodeKind::TypeQualifier)
            .and_then(declarator_name),
        NodeKind::ArrayDeclarator | NodeKind::FunctionDeclarator => {
            if declarator.text() == Some("abstract") {
                None
            } else {
                declarator.children.first().and_then(declarator_name)
            }
        }
        _ => None,
    }
}

/// Whether the declarator declares a function, looking through pointers
/// to the returned type.
fn is_function_declarator(declarator: &Node) -> bool {
    match declarator.kind {
        NodeKind::FunctionDeclarator => true,
        NodeKind::PointerDeclarator => declarator
            .children
            .last()
            .is_some_and(is_function_declarator),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::parse;

    fn unit(source: &str) -> Node {
        let outcome = parse(source);
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        outcome.translation_unit.unwrap()
    }

    #[test]
    fn test_declaration_with_initializers() {
        let tree = unit("int a = 1, *b, c[10];");
        let decl = &tree.children[0];
        assert_eq!(decl.kind, NodeKind::Declaration);
        assert_eq!(decl.children.len(), 4);
        assert_eq!(decl.children[1].text(), Some("="));
        assert_eq!(decl.children[2].children[0].kind, NodeKind::PointerDeclarator);
        assert_eq!(decl.children[3].children[0].kind, NodeKind::ArrayDeclarator);
    }

    #[test]
    fn test_function_definition_without_specifiers() {
        let tree = unit("main() { }");
        let def = &tree.children[0];
        assert_eq!(def.kind, NodeKind::FunctionDefinition);
        assert!(def.children[0].children.is_empty());
        assert_eq!(def.children[1].kind, NodeKind::FunctionDeclarator);
    }

    #[test]
    fn test_knr_definition() {
        let tree = unit("int add(a, b) int a; int b; { return a + b; }");
        let def = &tree.children[0];
        assert_eq!(def.kind, NodeKind::FunctionDefinition);
        assert_eq!(def.children[1].children[1].kind, NodeKind::IdentifierList);
        assert_eq!(def.children[2].kind, NodeKind::Declaration);
        assert_eq!(def.children[3].kind, NodeKind::Declaration);
        assert_eq!(def.children[4].kind, NodeKind::CompoundStatement);
    }

    #[test]
    fn test_prototype_is_a_declaration() {
        let tree = unit("int printf(const char *fmt, ...);");
        let decl = &tree.children[0];
        assert_eq!(decl.kind, NodeKind::Declaration);
        let function = &decl.children[1].children[0];
        assert_eq!(function.kind, NodeKind::FunctionDeclarator);
        let params = &function.children[1];
        assert_eq!(params.kind, NodeKind::ParameterList);
        assert_eq!(params.children[1].kind, NodeKind::Ellipsis);
    }

    #[test]
    fn test_function_pointer_declarator() {
        let tree = unit("void (*handler)(int);");
        let declarator = &tree.children[0].children[1].children[0];
        assert_eq!(declarator.kind, NodeKind::FunctionDeclarator);
        assert_eq!(declarator.children[0].kind, NodeKind::PointerDeclarator);
        assert_eq!(declarator_name(declarator), Some("handler"));
    }

    #[test]
    fn test_struct_with_bit_fields() {
        let tree = unit("struct flags { unsigned a : 1, : 3; int b; };");
        let spec = &tree.children[0].children[0].children[0];
        assert_eq!(spec.kind, NodeKind::StructOrUnionSpecifier);
        assert_eq!(spec.text(), Some("struct"));
        assert_eq!(spec.children[0].text(), Some("flags"));
        let bits = &spec.children[1];
        assert_eq!(bits.children[1].text(), Some(":"));
        assert_eq!(bits.children[2].children.len(), 1);
    }

    #[test]
    fn test_enum_with_values() {
        let tree = unit("enum color { RED, GREEN = 5, BLUE, };");
        let spec = &tree.children[0].children[0].children[0];
        assert_eq!(spec.kind, NodeKind::EnumSpecifier);
        assert_eq!(spec.children.len(), 4);
        assert_eq!(spec.children[2].text(), Some("GREEN"));
        assert_eq!(spec.children[2].children[0].kind, NodeKind::IntegerConstant);
    }

    #[test]
    fn test_typedef_name_becomes_specifier() {
        let tree = unit("typedef unsigned int uint; uint x; int f(uint);");
        let spec = &tree.children[1].children[0].children[0];
        assert_eq!(spec.kind, NodeKind::TypeSpecifier);
        assert_eq!(spec.text(), Some("uint"));
    }

    #[test]
    fn test_initializer_list() {
        let tree = unit("int grid[2][2] = { {1, 2}, {3, 4}, };");
        let init = &tree.children[0].children[1].children[1];
        assert_eq!(init.kind, NodeKind::InitializerList);
        assert_eq!(init.children.len(), 2);
        assert_eq!(init.children[0].kind, NodeKind::InitializerList);
    }

    #[test]
    fn test_abstract_declarators_in_prototype() {
        let tree = unit("int apply(int (*)(int), char []);");
        let params = &tree.children[0].children[1].children[0].children[1];
        assert_eq!(params.children.len(), 2);
        let first = &params.children[0].children[1];
        assert_eq!(first.kind, NodeKind::FunctionDeclarator);
        assert_eq!(first.children[0].kind, NodeKind::PointerDeclarator);
        assert_eq!(declarator_name(first), None);
    }

    #[test]
    fn test_enum_needs_an_enumerator() {
        let outcome = parse("enum e {}; int x;");
        assert!(outcome.diagnostics[0].message.contains("enumerator list"));
        let unit = outcome.translation_unit.unwrap();
        assert_eq!(unit.children.len(), 1);
        assert_eq!(declarator_name(&unit.children[0].children[1].children[0]), Some("x"));

        assert!(parse("enum e { A, };").diagnostics.is_empty());
    }

    #[test]
    fn test_non_declaration_consumes_nothing() {
        let mut parser = Parser::new("x = 1;").unwrap();
        assert!(matches!(parser.parse_declaration(), Ok(None)));
        assert_eq!(parser.position, 0);
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn test_declarator_nesting_limit() {
        let config = crate::config::Config::new().with_max_nesting(16);
        let source = format!("int {}p; int ok;", "*".repeat(40));
        let outcome = crate::parser::parse::parse_with_config(&source, &config);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].message.contains("maximum depth of 16"));
        assert_eq!(outcome.translation_unit.unwrap().children.len(), 1);
    }
}
