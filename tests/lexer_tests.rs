// Integration tests for the tokenizer

use assert_matches::assert_matches;
use ctree::config::Config;
use ctree::parser::{tokenize, Lexer, Literal, SourceLocation, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .expect("tokenize failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_integer_statement() {
    let tokens = tokenize("42;").expect("tokenize failed");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].kind, TokenKind::IntegerConstant);
    assert_eq!(tokens[0].lexeme, "42");
    assert_matches!(tokens[0].literal, Some(Literal::Integer(42)));
    assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    assert_eq!(tokens[2].kind, TokenKind::Eof);
}

#[test]
fn test_compound_assignment_operators_are_whole_tokens() {
    assert_eq!(
        kinds("a <<= b >>= c += d"),
        vec![
            TokenKind::Identifier,
            TokenKind::LtLtEq,
            TokenKind::Identifier,
            TokenKind::GtGtEq,
            TokenKind::Identifier,
            TokenKind::PlusEq,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let tokens = tokenize("int integer intx").expect("tokenize failed");
    assert_eq!(tokens[0].kind, TokenKind::Int);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_positions_across_lines() {
    let tokens = tokenize("int x;\n  return x;").expect("tokenize failed");
    assert_eq!(tokens[3].kind, TokenKind::Return);
    assert_eq!(tokens[3].location, SourceLocation::new(2, 3));
    assert_eq!(tokens[4].location, SourceLocation::new(2, 10));
}

#[test]
fn test_constant_forms() {
    let tokens = tokenize("0x1F 017 3.5 1e3 'A' \"hi\\n\"").expect("tokenize failed");
    assert_matches!(tokens[0].literal, Some(Literal::Integer(31)));
    assert_matches!(tokens[1].literal, Some(Literal::Integer(15)));
    assert_matches!(tokens[2].literal, Some(Literal::Floating(x)) if x == 3.5);
    assert_matches!(tokens[3].literal, Some(Literal::Floating(x)) if x == 1000.0);
    assert_matches!(tokens[4].literal, Some(Literal::Character(65)));
    assert_matches!(&tokens[5].literal, Some(Literal::String(s)) if s == "hi\n");
}

#[test]
fn test_unknown_character_is_fatal() {
    let err = tokenize("@").unwrap_err();
    assert_eq!(err.location, SourceLocation::new(1, 1));
    assert!(err.message.contains('@'));
}

#[test]
fn test_directives_follow_config() {
    let source = "#include <stdio.h>\nint x;";
    assert_eq!(kinds(source)[0], TokenKind::Int);

    let config = Config::new().with_skip_directives(false);
    assert!(Lexer::with_config(source, &config).tokenize().is_err());
}
