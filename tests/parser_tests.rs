// Integration tests for the parser: tree shapes for well-formed input

use assert_matches::assert_matches;
use ctree::parser::{parse, Literal, Node, NodeKind, Parser};

fn expression(source: &str) -> Node {
    let mut parser = Parser::new(source).expect("tokenize failed");
    let node = parser.parse_standalone_expression();
    assert!(parser.diagnostics().is_empty(), "{:?}", parser.diagnostics());
    node.expect("no expression")
}

fn statement(source: &str) -> Node {
    let mut parser = Parser::new(source).expect("tokenize failed");
    let node = parser.parse_standalone_statement();
    assert!(parser.diagnostics().is_empty(), "{:?}", parser.diagnostics());
    node.expect("no statement")
}

fn unit(source: &str) -> Node {
    let outcome = parse(source);
    assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
    outcome.translation_unit.expect("no translation unit")
}

#[test]
fn test_multiplication_binds_tighter() {
    let node = expression("a+b*c");
    assert_eq!(node.kind, NodeKind::AdditiveExpression);
    assert_eq!(node.text(), Some("+"));
    assert_eq!(node.children[0].kind, NodeKind::Identifier);
    assert_eq!(node.children[0].text(), Some("a"));

    let right = &node.children[1];
    assert_eq!(right.kind, NodeKind::MultiplicativeExpression);
    assert_eq!(right.text(), Some("*"));
    assert_eq!(right.children[0].text(), Some("b"));
    assert_eq!(right.children[1].text(), Some("c"));
}

#[test]
fn test_subtraction_is_left_associative() {
    let node = expression("a-b-c");
    let left = &node.children[0];
    assert_eq!(left.kind, NodeKind::AdditiveExpression);
    assert_eq!(left.children[0].text(), Some("a"));
    assert_eq!(left.children[1].text(), Some("b"));
    assert_eq!(node.children[1].kind, NodeKind::Identifier);
    assert_eq!(node.children[1].text(), Some("c"));
}

#[test]
fn test_parentheses_leave_no_node() {
    let node = expression("(a)");
    assert_eq!(node.kind, NodeKind::Identifier);
    assert_eq!(node.text(), Some("a"));
    assert!(node.children.is_empty());
}

#[test]
fn test_every_operator_level() {
    let node = expression("x = a || b && c | d ^ e & f == g < h << i + j * k");
    let kinds = node.kinds();
    for kind in [
        NodeKind::AssignmentExpression,
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
    ] {
        assert!(kinds.contains(&kind), "missing {}", kind);
    }
    // Each level nests directly inside the looser one
    assert_eq!(node.children[1].kind, NodeKind::LogicalOrExpression);
    assert_eq!(node.children[1].children[1].kind, NodeKind::LogicalAndExpression);
}

#[test]
fn test_compound_assignment_is_one_operator() {
    let node = expression("a <<= 2");
    assert_eq!(node.kind, NodeKind::AssignmentExpression);
    assert_eq!(node.text(), Some("<<="));
}

#[test]
fn test_if_else_has_three_children() {
    let node = statement("if (a) b; else c;");
    assert_eq!(node.kind, NodeKind::SelectionStatement);
    assert_eq!(node.children.len(), 3);
    assert_eq!(node.children[0].text(), Some("a"));
    assert_eq!(node.children[1].kind, NodeKind::ExpressionStatement);
    assert_eq!(node.children[1].children[0].text(), Some("b"));
    assert_eq!(node.children[2].children[0].text(), Some("c"));
}

#[test]
fn test_return_forms() {
    let bare = statement("return;");
    assert_eq!(bare.kind, NodeKind::JumpStatement);
    assert_eq!(bare.text(), Some("return"));
    assert!(bare.children.is_empty());

    let valued = statement("return a;");
    assert_eq!(valued.kind, NodeKind::JumpStatement);
    assert_eq!(valued.children.len(), 1);
    assert_eq!(valued.children[0].text(), Some("a"));
}

#[test]
fn test_constant_literals_reach_the_tree() {
    let node = expression("f(42, 'x', 2.5, \"a\" \"b\")");
    assert_matches!(node.children[1].literal, Some(Literal::Integer(42)));
    assert_matches!(node.children[2].literal, Some(Literal::Character(120)));
    assert_matches!(node.children[3].literal, Some(Literal::Floating(_)));
    assert_matches!(&node.children[4].literal, Some(Literal::String(s)) if s == "ab");
}

#[test]
fn test_realistic_program() {
    let source = r#"
        #include <stdio.h>

        typedef struct node {
            int value;
            struct node *next;
        } Node;

        static int count(const Node *head) {
            int n = 0;
            for (; head != 0; head = head->next)
                n++;
            return n;
        }

        int main(int argc, char **argv) {
            Node a, b;
            a.value = 1;
            a.next = &b;
            b.next = (Node *) 0;
            switch (argc) {
            case 1:
                printf("%d\n", count(&a));
                break;
            default:
                return sizeof(Node) > 8 ? 1 : 0;
            }
            return 0;
        }
    "#;

    let tree = unit(source);
    assert_eq!(tree.kind, NodeKind::TranslationUnit);
    assert_eq!(tree.children.len(), 3);
    assert_eq!(tree.children[0].kind, NodeKind::Declaration);
    assert_eq!(tree.children[1].kind, NodeKind::FunctionDefinition);
    assert_eq!(tree.children[2].kind, NodeKind::FunctionDefinition);

    let kinds = tree.kinds();
    assert!(kinds.contains(&NodeKind::CastExpression));
    assert!(kinds.contains(&NodeKind::MemberExpression));
    assert!(kinds.contains(&NodeKind::ConditionalExpression));
    assert!(kinds.contains(&NodeKind::LabeledStatement));
}

#[test]
fn test_tree_kinds_come_from_the_closed_set() {
    let tree = unit(
        "enum e { A = 1 }; union u { int i; float f; }; \
         int g(int (*cb)(void), ...) { do { goto out; } while (0); out: return ~-!0; }",
    );
    tree.walk(&mut |node, ancestors| {
        assert!(NodeKind::ALL.contains(&node.kind));
        if let Some(parent) = ancestors.last() {
            assert!(parent.children.iter().any(|c| std::ptr::eq(c, node)));
        }
    });
}
