// Integration tests for diagnostics and panic-mode recovery

use assert_matches::assert_matches;
use ctree::config::Config;
use ctree::parser::{parse, parse_with_config, NodeKind, Parser, Severity, TokenKind};

#[test]
fn test_unterminated_parenthesis_expression() {
    let mut parser = Parser::new("(a").expect("tokenize failed");
    let node = parser.parse_standalone_expression();

    assert!(node.is_none());
    let diagnostics = parser.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Syntax);
    assert!(diagnostics[0].expected.contains(')'));
    assert_matches!(&diagnostics[0].found, Some(token) if token.kind == TokenKind::Eof);
}

#[test]
fn test_later_declarations_survive_a_bad_one() {
    let outcome = parse("int x = (a;\nint y;\nint z = 3;");
    let unit = outcome.translation_unit.expect("no translation unit");

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].location.line, 1);
    assert!(outcome.diagnostics[0].expected.contains(')'));

    // The broken declaration is dropped, the next two parse normally
    assert_eq!(unit.children.len(), 2);
    assert!(unit.children.iter().all(|d| d.kind == NodeKind::Declaration));
}

#[test]
fn test_lexical_error_is_the_only_diagnostic() {
    let outcome = parse("int main() { return 0; }\n@");
    assert!(outcome.translation_unit.is_none());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].severity, Severity::Lexical);
    assert!(outcome.diagnostics[0].is_fatal());
    assert_eq!(outcome.diagnostics[0].location.line, 2);
}

#[test]
fn test_one_diagnostic_per_broken_statement() {
    let source = r#"
        int main() {
            int a = 1;
            a = ;
            a = a + 1;
            if (a > ) a = 0;
            while (a) a--;
            return a
        }
    "#;
    let outcome = parse(source);
    let unit = outcome.translation_unit.expect("no translation unit");

    let lines: Vec<usize> = outcome.diagnostics.iter().map(|d| d.location.line).collect();
    assert_eq!(lines, vec![4, 6, 9]);

    let body = unit.children[0].children.last().expect("no body");
    assert_eq!(body.kind, NodeKind::CompoundStatement);
    let kinds: Vec<NodeKind> = body.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Declaration,
            NodeKind::ExpressionStatement,
            NodeKind::IterationStatement,
        ]
    );
}

#[test]
fn test_stray_tokens_at_top_level() {
    let outcome = parse("} 42; int ok;");
    let unit = outcome.translation_unit.expect("no translation unit");
    assert_eq!(outcome.diagnostics.len(), 2);
    assert_eq!(unit.children.len(), 1);
    assert_eq!(unit.children[0].kind, NodeKind::Declaration);
}

#[test]
fn test_missing_closing_brace_reports_eof() {
    let outcome = parse("int f() { return 1;");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_matches!(&outcome.diagnostics[0].found, Some(token) if token.kind == TokenKind::Eof);
}

#[test]
fn test_error_budget_stops_early() {
    let source = "int 1;\nint 2;\nint 3;\nint ok;";
    assert_eq!(parse(source).diagnostics.len(), 3);

    let config = Config::new().with_max_errors(Some(2));
    let outcome = parse_with_config(source, &config);
    assert_eq!(outcome.diagnostics.len(), 2);
    assert!(outcome.translation_unit.expect("no translation unit").children.is_empty());
}

#[test]
fn test_recovery_always_terminates() {
    for source in ["(((((", "int int int", "{{{{", "}}}}", "if if if", "a b c d", "struct {"] {
        let outcome = parse(source);
        assert!(outcome.translation_unit.is_some(), "{}", source);
        assert!(!outcome.diagnostics.is_empty(), "{}", source);
    }
}

#[test]
fn test_diagnostic_display() {
    let outcome = parse("int x = ;");
    assert_eq!(
        outcome.diagnostics[0].to_string(),
        "syntax error at line 1, column 9: Expected an initializer after '=', found ';'"
    );
}

/// Parse on a thread with the default 2 MiB test stack.
fn parse_on_small_stack(source: String) -> ctree::parser::ParseOutcome {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(move || parse(&source))
        .expect("spawn failed")
        .join()
        .expect("parser thread panicked")
}

fn nested_parens(depth: usize) -> String {
    format!("int x = {}1{};\nint y;", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_nesting_within_the_limit_parses_cleanly() {
    let outcome = parse_on_small_stack(nested_parens(64));
    assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
    assert_eq!(outcome.translation_unit.expect("no translation unit").children.len(), 2);
}

#[test]
fn test_deep_nesting_is_a_diagnostic_not_a_crash() {
    let outcome = parse_on_small_stack(nested_parens(200));
    let unit = outcome.translation_unit.expect("no translation unit");

    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].message.contains("maximum depth"));
    assert_eq!(outcome.diagnostics[0].location.line, 1);
    // Recovery resumes at the next declaration
    assert_eq!(unit.children.len(), 1);
}

#[test]
fn test_nesting_limit_is_configurable() {
    let source = nested_parens(10);
    let config = Config::new().with_max_nesting(5);
    let outcome = parse_with_config(&source, &config);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].message.contains("maximum depth of 5"));

    let config = Config::new().with_max_nesting(20);
    assert!(parse_with_config(&source, &config).is_clean());
}

#[test]
fn test_deep_blocks_and_unary_chains_terminate() {
    let blocks = format!("int f() {{ {}x;{} }}", "{".repeat(300), "}".repeat(300));
    let unary = format!("int x = {}1;", "-".repeat(300));
    for source in [blocks, unary] {
        let outcome = parse_on_small_stack(source);
        assert!(outcome.translation_unit.is_some());
        assert!(outcome.diagnostics[0].message.contains("maximum depth"));
    }
}
