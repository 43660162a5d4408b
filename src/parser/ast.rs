// AST (Abstract Syntax Tree) definitions for the C front end

use super::token::Literal;
use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Closed set of node kinds. Every node in every tree the parser builds has
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Primary expressions
    Identifier,
    IntegerConstant,
    CharacterConstant,
    FloatingConstant,
    EnumerationConstant,
    StringLiteral,

    // Operator levels, loosest first
    CommaExpression,
    AssignmentExpression,
    ConditionalExpression,
    LogicalOrExpression,
    LogicalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    RelationalExpression,
    ShiftExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    CastExpression,
    UnaryExpression,

    // Postfix suffixes
    SubscriptExpression,
    CallExpression,
    MemberExpression,
    PostfixExpression,

    // Declarations
    Declaration,
    DeclarationSpecifiers,
    StorageClassSpecifier,
    TypeSpecifier,
    TypeQualifier,
    StructOrUnionSpecifier,
    StructDeclaration,
    EnumSpecifier,
    InitDeclarator,
    PointerDeclarator,
    ArrayDeclarator,
    FunctionDeclarator,
    ParameterList,
    ParameterDeclaration,
    IdentifierList,
    Ellipsis,
    TypeName,
    InitializerList,

    // Statements
    LabeledStatement,
    CompoundStatement,
    ExpressionStatement,
    SelectionStatement,
    IterationStatement,
    JumpStatement,

    // Top level
    FunctionDefinition,
    TranslationUnit,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Identifier,
        NodeKind::IntegerConstant,
        NodeKind::CharacterConstant,
        NodeKind::FloatingConstant,
        NodeKind::EnumerationConstant,
        NodeKind::StringLiteral,
        NodeKind::CommaExpression,
        NodeKind::AssignmentExpression,
        NodeKind::ConditionalExpression,
        NodeKind::LogicalOrExpression,
        NodeKind::LogicalAndExpression,
        NodeKind::InclusiveOrExpression,
        NodeKind::ExclusiveOrExpression,
        NodeKind::AndExpression,
        NodeKind::EqualityExpression,
        NodeKind::RelationalExpression,
        NodeKind::ShiftExpression,
        NodeKind::AdditiveExpression,
        NodeKind::MultiplicativeExpression,
        NodeKind::CastExpression,
        NodeKind::UnaryExpression,
        NodeKind::SubscriptExpression,
        NodeKind::CallExpression,
        NodeKind::MemberExpression,
        NodeKind::PostfixExpression,
        NodeKind::Declaration,
        NodeKind::DeclarationSpecifiers,
        NodeKind::StorageClassSpecifier,
        NodeKind::TypeSpecifier,
        NodeKind::TypeQualifier,
        NodeKind::StructOrUnionSpecifier,
        NodeKind::StructDeclaration,
        NodeKind::EnumSpecifier,
        NodeKind::InitDeclarator,
        NodeKind::PointerDeclarator,
        NodeKind::ArrayDeclarator,
        NodeKind::FunctionDeclarator,
        NodeKind::ParameterList,
        NodeKind::ParameterDeclaration,
        NodeKind::IdentifierList,
        NodeKind::Ellipsis,
        NodeKind::TypeName,
        NodeKind::InitializerList,
        NodeKind::LabeledStatement,
        NodeKind::CompoundStatement,
        NodeKind::ExpressionStatement,
        NodeKind::SelectionStatement,
        NodeKind::IterationStatement,
        NodeKind::JumpStatement,
        NodeKind::FunctionDefinition,
        NodeKind::TranslationUnit,
    ];

    /// Human-readable name used by the tree printer.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Identifier => "identifier",
            NodeKind::IntegerConstant => "integer-constant",
            NodeKind::CharacterConstant => "character-constant",
            NodeKind::FloatingConstant => "floating-constant",
            NodeKind::EnumerationConstant => "enumeration-constant",
            NodeKind::StringLiteral => "string-literal",
            NodeKind::CommaExpression => "expression",
            NodeKind::AssignmentExpression => "assignment-expression",
            NodeKind::ConditionalExpression => "conditional-expression",
            NodeKind::LogicalOrExpression => "logical-or-expression",
            NodeKind::LogicalAndExpression => "logical-and-expression",
            NodeKind::InclusiveOrExpression => "inclusive-or-expression",
            NodeKind::ExclusiveOrExpression => "exclusive-or-expression",
            NodeKind::AndExpression => "and-expression",
            NodeKind::EqualityExpression => "equality-expression",
            NodeKind::RelationalExpression => "relational-expression",
            NodeKind::ShiftExpression => "shift-expression",
            NodeKind::AdditiveExpression => "additive-expression",
            NodeKind::MultiplicativeExpression => "multiplicative-expression",
            NodeKind::CastExpression => "cast-expression",
            NodeKind::UnaryExpression => "unary-expression",
            NodeKind::SubscriptExpression => "subscript-expression",
            NodeKind::CallExpression => "call-expression",
            NodeKind::MemberExpression => "member-expression",
            NodeKind::PostfixExpression => "postfix-expression",
            NodeKind::Declaration => "declaration",
            NodeKind::DeclarationSpecifiers => "declaration-specifiers",
            NodeKind::StorageClassSpecifier => "storage-class-specifier",
            NodeKind::TypeSpecifier => "type-specifier",
            NodeKind::TypeQualifier => "type-qualifier",
            NodeKind::StructOrUnionSpecifier => "struct-or-union-specifier",
            NodeKind::StructDeclaration => "struct-declaration",
            NodeKind::EnumSpecifier => "enum-specifier",
            NodeKind::InitDeclarator => "init-declarator",
            NodeKind::PointerDeclarator => "pointer-declarator",
            NodeKind::ArrayDeclarator => "array-declarator",
            NodeKind::FunctionDeclarator => "function-declarator",
            NodeKind::ParameterList => "parameter-list",
            NodeKind::ParameterDeclaration => "parameter-declaration",
            NodeKind::IdentifierList => "identifier-list",
            NodeKind::Ellipsis => "ellipsis",
            NodeKind::TypeName => "type-name",
            NodeKind::InitializerList => "initializer-list",
            NodeKind::LabeledStatement => "labeled-statement",
            NodeKind::CompoundStatement => "compound-statement",
            NodeKind::ExpressionStatement => "expression-statement",
            NodeKind::SelectionStatement => "selection-statement",
            NodeKind::IterationStatement => "iteration-statement",
            NodeKind::JumpStatement => "jump-statement",
            NodeKind::FunctionDefinition => "function-definition",
            NodeKind::TranslationUnit => "translation-unit",
        }
    }

    /// Kinds that are valid targets of an assignment operator: anything the
    /// unary-expression level can produce on its own.
    pub fn is_unary_level(self) -> bool {
        matches!(
            self,
            NodeKind::Identifier
                | NodeKind::IntegerConstant
                | NodeKind::CharacterConstant
                | NodeKind::FloatingConstant
                | NodeKind::EnumerationConstant
                | NodeKind::StringLiteral
                | NodeKind::UnaryExpression
                | NodeKind::SubscriptExpression
                | NodeKind::CallExpression
                | NodeKind::MemberExpression
                | NodeKind::PostfixExpression
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the syntax tree.
///
/// Children are owned exclusively and kept in source order; their meaning is
/// positional per kind (e.g. a selection statement's children are condition,
/// then-branch and optional else-branch).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Node {
            kind,
            location,
            literal: None,
            children: Vec::new(),
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_literal(Literal::text(text))
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Binary node `[left, right]` tagged with its operator lexeme.
    pub fn binary(
        kind: NodeKind,
        op: impl Into<String>,
        location: SourceLocation,
        left: Node,
        right: Node,
    ) -> Self {
        Node::new(kind, location)
            .with_text(op)
            .with_child(left)
            .with_child(right)
    }

    /// Text of the literal payload, for identifiers, operators and keywords.
    pub fn text(&self) -> Option<&str> {
        self.literal.as_ref().and_then(Literal::as_text)
    }

    /// Pre-order traversal. The visitor receives each node together with its
    /// ancestors, root first.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Node, &[&'a Node]),
    {
        let mut ancestors = Vec::new();
        self.walk_with(&mut ancestors, visit);
    }

    fn walk_with<'a, F>(&'a self, ancestors: &mut Vec<&'a Node>, visit: &mut F)
    where
        F: FnMut(&'a Node, &[&'a Node]),
    {
        visit(self, &ancestors[..]);
        ancestors.push(self);
        for child in &self.children {
            child.walk_with(ancestors, visit);
        }
        ancestors.pop();
    }

    /// Every kind that appears in this subtree, in pre-order.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds = Vec::new();
        self.walk(&mut |node, _| kinds.push(node.kind));
        kinds
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::new(NodeKind::Identifier, SourceLocation::new(1, 1)).with_text(name)
    }

    #[test]
    fn test_binary_children_order() {
        let node = Node::binary(
            NodeKind::AdditiveExpression,
            "+",
            SourceLocation::new(1, 3),
            ident("a"),
            ident("b"),
        );
        assert_eq!(node.text(), Some("+"));
        assert_eq!(node.children[0].text(), Some("a"));
        assert_eq!(node.children[1].text(), Some("b"));
        assert_eq!(node.size(), 3);
    }

    #[test]
    fn test_walk_passes_ancestors() {
        let tree = Node::new(NodeKind::TranslationUnit, SourceLocation::new(1, 1)).with_child(
            Node::new(NodeKind::ExpressionStatement, SourceLocation::new(1, 1))
                .with_child(ident("x")),
        );

        let mut depths = Vec::new();
        tree.walk(&mut |node, ancestors| {
            depths.push((node.kind, ancestors.len()));
            if node.kind == NodeKind::Identifier {
                assert_eq!(ancestors[0].kind, NodeKind::TranslationUnit);
                assert_eq!(ancestors[1].kind, NodeKind::ExpressionStatement);
            }
        });

        assert_eq!(
            depths,
            vec![
                (NodeKind::TranslationUnit, 0),
                (NodeKind::ExpressionStatement, 1),
                (NodeKind::Identifier, 2),
            ]
        );
    }

    #[test]
    fn test_all_kinds_have_distinct_names() {
        let mut names: Vec<_> = NodeKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NodeKind::ALL.len());
    }
}
