//! Token definitions shared by the lexer and the parser
//!
//! A [`Token`] is an immutable record: its [`TokenKind`], the exact lexeme it
//! was matched from, its [`SourceLocation`] and, for constants, the decoded
//! [`Literal`] value. Tokens are created once by the lexer and only read after
//! that.

use super::ast::SourceLocation;
use serde::Serialize;
use std::fmt;

/// Closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Names and constants
    Identifier,
    IntegerConstant,
    FloatingConstant,
    CharacterConstant,
    StringLiteral,

    // Keywords
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Int,
    Long,
    Register,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,
    Colon,     // :
    Question,  // ?
    Dot,       // .
    Ellipsis,  // ...
    Arrow,     // ->

    // Operators
    PlusPlus,   // ++
    MinusMinus, // --
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    Tilde,      // ~
    Bang,       // !
    LtLt,       // <<
    GtGt,       // >>
    Lt,         // <
    Gt,         // >
    Le,         // <=
    Ge,         // >=
    EqEq,       // ==
    NotEq,      // !=
    AndAnd,     // &&
    OrOr,       // ||

    // Assignment
    Eq,        // =
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    PlusEq,    // +=
    MinusEq,   // -=
    LtLtEq,    // <<=
    GtGtEq,    // >>=
    AmpEq,     // &=
    CaretEq,   // ^=
    PipeEq,    // |=

    Eof,
}

/// Reserved words, in the order the lexer's keyword table is built.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("auto", TokenKind::Auto),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("char", TokenKind::Char),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("double", TokenKind::Double),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("extern", TokenKind::Extern),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("register", TokenKind::Register),
    ("return", TokenKind::Return),
    ("short", TokenKind::Short),
    ("signed", TokenKind::Signed),
    ("sizeof", TokenKind::Sizeof),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("typedef", TokenKind::Typedef),
    ("union", TokenKind::Union),
    ("unsigned", TokenKind::Unsigned),
    ("void", TokenKind::Void),
    ("volatile", TokenKind::Volatile),
    ("while", TokenKind::While),
];

/// Punctuators and operators. The lexer picks the longest spelling that
/// matches, so table order does not matter for correctness.
pub const PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
    ("->", TokenKind::Arrow),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("&=", TokenKind::AmpEq),
    ("^=", TokenKind::CaretEq),
    ("|=", TokenKind::PipeEq),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("?", TokenKind::Question),
    (".", TokenKind::Dot),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
];

impl TokenKind {
    /// Fixed spelling for keywords and punctuators, `None` for kinds whose
    /// lexeme varies (identifiers, constants) and for end of file.
    pub fn spelling(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(PUNCTUATORS.iter())
            .find(|(_, kind)| *kind == self)
            .map(|(text, _)| *text)
    }

    /// Storage-class specifiers (`typedef` included, as in the C grammar).
    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            TokenKind::Typedef
                | TokenKind::Extern
                | TokenKind::Static
                | TokenKind::Auto
                | TokenKind::Register
        )
    }

    /// Built-in type specifiers plus the keywords that open a tagged type.
    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Enum
        )
    }

    pub fn is_type_qualifier(self) -> bool {
        matches!(self, TokenKind::Const | TokenKind::Volatile)
    }

    /// Keywords that can only start a declaration.
    pub fn starts_declaration(self) -> bool {
        self.is_storage_class() || self.is_type_specifier() || self.is_type_qualifier()
    }

    /// Keywords that can only start a statement.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Switch
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Goto
                | TokenKind::Continue
                | TokenKind::Break
                | TokenKind::Return
                | TokenKind::Case
                | TokenKind::Default
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::AmpEq
                | TokenKind::CaretEq
                | TokenKind::PipeEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::IntegerConstant => write!(f, "integer constant"),
            TokenKind::FloatingConstant => write!(f, "floating constant"),
            TokenKind::CharacterConstant => write!(f, "character constant"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Eof => write!(f, "end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// Decoded value carried by constant tokens and by AST nodes.
///
/// `Text` is only used on AST nodes, for operator lexemes, identifier names and
/// keywords.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(u64),
    Floating(f64),
    Character(u32),
    String(String),
    Text(String),
}

impl Literal {
    pub fn text(text: impl Into<String>) -> Self {
        Literal::Text(text.into())
    }

    /// The text payload, for identifier and operator literals.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) | Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Floating(x) => write!(f, "{:?}", x),
            Literal::Character(c) => match char::from_u32(*c) {
                Some(ch) if ch.is_ascii_graphic() || ch == ' ' => write!(f, "'{}'", ch),
                _ => write!(f, "'\\x{:02x}'", c),
            },
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            location,
            literal: None,
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn eof(location: SourceLocation) -> Self {
        Token::new(TokenKind::Eof, "", location)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::IntegerConstant
            | TokenKind::FloatingConstant
            | TokenKind::CharacterConstant
            | TokenKind::StringLiteral => write!(f, "{} {}", self.kind, self.lexeme),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_round_trips_through_tables() {
        assert_eq!(TokenKind::LtLtEq.spelling(), Some("<<="));
        assert_eq!(TokenKind::While.spelling(), Some("while"));
        assert_eq!(TokenKind::Identifier.spelling(), None);
    }

    #[test]
    fn test_token_display() {
        let loc = SourceLocation::new(1, 1);
        assert_eq!(Token::new(TokenKind::Identifier, "x", loc).to_string(), "identifier 'x'");
        assert_eq!(Token::new(TokenKind::RParen, ")", loc).to_string(), "')'");
        assert_eq!(Token::eof(loc).to_string(), "end of file");
    }

    #[test]
    fn test_keyword_classes() {
        assert!(TokenKind::Typedef.is_storage_class());
        assert!(TokenKind::Enum.starts_declaration());
        assert!(TokenKind::Volatile.starts_declaration());
        assert!(!TokenKind::Identifier.starts_declaration());
        assert!(TokenKind::Return.starts_statement());
        assert!(TokenKind::PipeEq.is_assignment_operator());
        assert!(!TokenKind::EqEq.is_assignment_operator());
    }
}
