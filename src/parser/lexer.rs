//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//!
//! At every position the lexer runs each lexical [`Category`] scanner and keeps
//! the longest match (maximal munch), so `+=` is never split into `+` `=` and
//! `1.5e3` is never split into `1` `.5e3`. [`CATEGORIES`] order only breaks ties
//! between equal-length matches, which is how `if` becomes a keyword rather
//! than an identifier.
//!
//! Whitespace, comments and (by default) preprocessor lines are matched like
//! any other category but never emitted. A position where nothing matches is a
//! fatal [`LexError`].

use super::ast::SourceLocation;
use super::diagnostics::LexError;
use super::token::{Literal, Token, TokenKind, KEYWORDS, PUNCTUATORS};
use crate::config::Config;
use log::{debug, trace};
use rustc_hash::FxHashMap;

/// Lexical categories, in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Whitespace,
    LineComment,
    BlockComment,
    Directive,
    Keyword,
    Identifier,
    FloatingConstant,
    IntegerConstant,
    CharacterConstant,
    StringLiteral,
    Punctuator,
}

pub const CATEGORIES: &[Category] = &[
    Category::Whitespace,
    Category::LineComment,
    Category::BlockComment,
    Category::Directive,
    Category::Keyword,
    Category::Identifier,
    Category::FloatingConstant,
    Category::IntegerConstant,
    Category::CharacterConstant,
    Category::StringLiteral,
    Category::Punctuator,
];

impl Category {
    /// Categories that advance the position but produce no token.
    fn is_trivia(self) -> bool {
        matches!(
            self,
            Category::Whitespace | Category::LineComment | Category::BlockComment | Category::Directive
        )
    }
}

/// Result of running one category scanner at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    NoMatch,
    Match(usize),
    /// The category definitely starts here but never ends (e.g. `/*` with no
    /// `*/`). Fatal.
    Unterminated(&'static str),
}

/// Tokenize `source` with the default [`Config`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    keywords: FxHashMap<&'static str, TokenKind>,
    skip_directives: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self::with_config(input, &Config::default())
    }

    pub fn with_config(input: &str, config: &Config) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            keywords: KEYWORDS.iter().copied().collect(),
            skip_directives: config.skip_directives,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let loc = self.current_location();
            let (category, len) = self.longest_match()?;

            let start = self.position;
            for _ in 0..len {
                self.advance();
            }

            if category.is_trivia() {
                trace!("skipped {:?} at {}", category, loc);
                continue;
            }

            let lexeme: String = self.input[start..start + len].iter().collect();
            tokens.push(self.make_token(category, lexeme, loc)?);
        }

        tokens.push(Token::eof(self.current_location()));
        debug!("tokenized {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }

    /// Run every category at the current position and keep the longest match.
    fn longest_match(&self) -> Result<(Category, usize), LexError> {
        let mut best: Option<(Category, usize)> = None;

        for &category in CATEGORIES {
            match self.scan(category) {
                Scan::Match(len) if best.map_or(true, |(_, best_len)| len > best_len) => {
                    best = Some((category, len));
                }
                Scan::Unterminated(message) => {
                    return Err(LexError::new(message, self.current_location()));
                }
                _ => {}
            }
        }

        best.ok_or_else(|| {
            let ch = self.peek().unwrap_or('\0');
            LexError::new(
                format!("Unexpected character: '{}'", ch.escape_default()),
                self.current_location(),
            )
        })
    }

    fn scan(&self, category: Category) -> Scan {
        let rest = &self.input[self.position..];
        match category {
            Category::Whitespace => {
                let len = rest.iter().take_while(|c| is_whitespace(**c)).count();
                matched(len)
            }
            Category::LineComment => {
                if rest.starts_with(&['/', '/']) {
                    matched(rest.iter().take_while(|c| **c != '\n').count())
                } else {
                    Scan::NoMatch
                }
            }
            Category::BlockComment => scan_block_comment(rest),
            Category::Directive => {
                if self.skip_directives && rest.first() == Some(&'#') && self.at_line_start() {
                    matched(scan_logical_line(rest))
                } else {
                    Scan::NoMatch
                }
            }
            Category::Keyword => {
                let len = scan_word(rest);
                let word: String = rest[..len].iter().collect();
                if len > 0 && self.keywords.contains_key(word.as_str()) {
                    Scan::Match(len)
                } else {
                    Scan::NoMatch
                }
            }
            Category::Identifier => matched(scan_word(rest)),
            Category::FloatingConstant => matched(scan_floating(rest)),
            Category::IntegerConstant => matched(scan_integer(rest)),
            Category::CharacterConstant => scan_quoted(rest, '\'', "Unterminated character constant"),
            Category::StringLiteral => scan_quoted(rest, '"', "Unterminated string literal"),
            Category::Punctuator => PUNCTUATORS
                .iter()
                .map(|(text, _)| *text)
                .filter(|text| starts_with_str(rest, text))
                .map(|text| text.len())
                .max()
                .map_or(Scan::NoMatch, Scan::Match),
        }
    }

    /// Build the token for a non-trivia match, decoding constants.
    fn make_token(
        &self,
        category: Category,
        lexeme: String,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        let token = match category {
            Category::Keyword => {
                let kind = self.keywords[lexeme.as_str()];
                Token::new(kind, lexeme, loc)
            }
            Category::Identifier => Token::new(TokenKind::Identifier, lexeme, loc),
            Category::IntegerConstant => {
                let value = decode_integer(&lexeme).ok_or_else(|| {
                    LexError::new(format!("Invalid integer constant: {}", lexeme), loc)
                })?;
                Token::new(TokenKind::IntegerConstant, lexeme, loc)
                    .with_literal(Literal::Integer(value))
            }
            Category::FloatingConstant => {
                let value = decode_floating(&lexeme).ok_or_else(|| {
                    LexError::new(format!("Invalid floating constant: {}", lexeme), loc)
                })?;
                Token::new(TokenKind::FloatingConstant, lexeme, loc)
                    .with_literal(Literal::Floating(value))
            }
            Category::CharacterConstant => {
                let body = quoted_body(&lexeme, '\'');
                let chars = unescape(body, loc)?;
                if chars.is_empty() {
                    return Err(LexError::new("Empty character constant", loc));
                }
                let value = match chars.as_slice() {
                    [single] => *single as u32,
                    // Multi-character constants pack bytes left to right.
                    many => many
                        .iter()
                        .fold(0u32, |acc, c| acc.wrapping_shl(8) | (*c as u32 & 0xff)),
                };
                Token::new(TokenKind::CharacterConstant, lexeme, loc)
                    .with_literal(Literal::Character(value))
            }
            Category::StringLiteral => {
                let body = quoted_body(&lexeme, '"');
                let text: String = unescape(body, loc)?.into_iter().collect();
                Token::new(TokenKind::StringLiteral, lexeme, loc).with_literal(Literal::String(text))
            }
            Category::Punctuator => {
                let kind = PUNCTUATORS
                    .iter()
                    .find(|(text, _)| *text == lexeme)
                    .map(|(_, kind)| *kind)
                    .ok_or_else(|| LexError::new(format!("Unknown operator: {}", lexeme), loc))?;
                Token::new(kind, lexeme, loc)
            }
            trivia => {
                return Err(LexError::new(
                    format!("{:?} does not produce a token", trivia),
                    loc,
                ))
            }
        };
        Ok(token)
    }

    /// Only whitespace precedes the current position on this line.
    fn at_line_start(&self) -> bool {
        self.input[..self.position]
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .all(|c| *c == ' ' || *c == '\t')
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn matched(len: usize) -> Scan {
    if len == 0 {
        Scan::NoMatch
    } else {
        Scan::Match(len)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c')
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn starts_with_str(rest: &[char], text: &str) -> bool {
    let mut chars = rest.iter();
    text.chars().all(|t| chars.next() == Some(&t))
}

fn count_digits(rest: &[char], radix: u32) -> usize {
    rest.iter().take_while(|c| c.is_digit(radix)).count()
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn scan_word(rest: &[char]) -> usize {
    match rest.first() {
        Some(c) if is_word_start(*c) => 1 + rest[1..].iter().take_while(|c| is_word_char(**c)).count(),
        _ => 0,
    }
}

fn scan_block_comment(rest: &[char]) -> Scan {
    if !rest.starts_with(&['/', '*']) {
        return Scan::NoMatch;
    }
    let mut i = 2;
    while i + 1 < rest.len() {
        if rest[i] == '*' && rest[i + 1] == '/' {
            return Scan::Match(i + 2);
        }
        i += 1;
    }
    Scan::Unterminated("Unterminated block comment")
}

/// Up to (not including) the newline, honouring backslash-newline splices.
fn scan_logical_line(rest: &[char]) -> usize {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            '\\' if rest.get(i + 1) == Some(&'\n') => i += 2,
            '\n' => break,
            _ => i += 1,
        }
    }
    i
}

/// Decimal, octal or hexadecimal digits plus any trailing word characters;
/// suffix validity is checked when decoding.
fn scan_integer(rest: &[char]) -> usize {
    match rest.first() {
        Some(c) if c.is_ascii_digit() => 1 + rest[1..].iter().take_while(|c| is_word_char(**c)).count(),
        _ => 0,
    }
}

/// `digits '.' digits? exponent?`, `'.' digits exponent?` or
/// `digits exponent`, followed by an optional `f`/`l` suffix.
fn scan_floating(rest: &[char]) -> usize {
    let int_digits = count_digits(rest, 10);
    let mut i = int_digits;
    let mut has_fraction = false;

    if rest.get(i) == Some(&'.') {
        let frac_digits = count_digits(&rest[i + 1..], 10);
        if int_digits == 0 && frac_digits == 0 {
            return 0;
        }
        has_fraction = true;
        i += 1 + frac_digits;
    } else if int_digits == 0 {
        return 0;
    }

    let exponent = scan_exponent(&rest[i..]);
    if !has_fraction && exponent == 0 {
        return 0;
    }
    i += exponent;

    if matches!(rest.get(i), Some('f' | 'F' | 'l' | 'L')) {
        i += 1;
    }
    i
}

fn scan_exponent(rest: &[char]) -> usize {
    if !matches!(rest.first(), Some('e' | 'E')) {
        return 0;
    }
    let sign = usize::from(matches!(rest.get(1), Some('+' | '-')));
    let digits = count_digits(&rest[1 + sign..], 10);
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

/// Character constants and string literals, with an optional `L` prefix.
fn scan_quoted(rest: &[char], quote: char, unterminated: &'static str) -> Scan {
    let open = match rest {
        [c, ..] if *c == quote => 1,
        ['L', c, ..] if *c == quote => 2,
        _ => return Scan::NoMatch,
    };

    let mut i = open;
    while i < rest.len() {
        match rest[i] {
            '\\' if rest[i + 1..].starts_with(&['\r', '\n']) => i += 3,
            '\\' => i += 2,
            '\n' => break,
            c if c == quote => return Scan::Match(i + 1),
            _ => i += 1,
        }
    }
    Scan::Unterminated(unterminated)
}

/// Strip the optional `L` prefix and the quotes.
fn quoted_body(lexeme: &str, quote: char) -> &str {
    let lexeme = lexeme.strip_prefix('L').unwrap_or(lexeme);
    lexeme
        .strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .unwrap_or(lexeme)
}

/// Resolve escape sequences in a quoted body.
fn unescape(body: &str, loc: SourceLocation) -> Result<Vec<char>, LexError> {
    let mut out = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let escaped = chars
            .next()
            .ok_or_else(|| LexError::new("Incomplete escape sequence", loc))?;

        // Backslash-newline joins the two source lines
        if escaped == '\n' {
            continue;
        }
        if escaped == '\r' && chars.peek() == Some(&'\n') {
            chars.next();
            continue;
        }

        let value = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'v' => '\x0b',
            'f' => '\x0c',
            'a' => '\x07',
            'b' => '\x08',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '?' => '?',
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(code).unwrap_or('\0')
            }
            'x' => {
                let mut code: u32 = 0;
                let mut digits = 0;
                while let Some(digit) = chars.peek().and_then(|c| c.to_digit(16)) {
                    code = code.wrapping_mul(16).wrapping_add(digit);
                    digits += 1;
                    chars.next();
                }
                if digits == 0 {
                    return Err(LexError::new("Incomplete hex escape sequence", loc));
                }
                char::from_u32(code)
                    .ok_or_else(|| LexError::new(format!("Invalid hex escape sequence: \\x{:x}", code), loc))?
            }
            _ => {
                return Err(LexError::new(
                    format!("Unknown escape sequence: \\{}", escaped),
                    loc,
                ))
            }
        };
        out.push(value);
    }

    Ok(out)
}

/// Decode an integer constant, validating its `u`/`l` suffix.
fn decode_integer(lexeme: &str) -> Option<u64> {
    let (radix, body) = if let Some(hex) = lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        (16, hex)
    } else if lexeme.len() > 1 && lexeme.starts_with('0') {
        (8, &lexeme[1..])
    } else {
        (10, lexeme)
    };

    let digits_end = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    let (digits, suffix) = body.split_at(digits_end);
    if !is_valid_integer_suffix(suffix) {
        return None;
    }

    match (digits.is_empty(), radix) {
        // `0x` needs at least one digit; `0u` is a plain zero.
        (true, 16) => None,
        (true, _) => Some(0),
        (false, _) => u64::from_str_radix(digits, radix).ok(),
    }
}

/// `u`, `l`, `ul`, `lu`, `ll`, `ull`, `llu` in any case.
fn is_valid_integer_suffix(suffix: &str) -> bool {
    let lower = suffix.to_ascii_lowercase();
    matches!(
        lower.as_str(),
        "" | "u" | "l" | "ul" | "lu" | "ll" | "ull" | "llu"
    )
}

fn decode_floating(lexeme: &str) -> Option<f64> {
    let digits = lexeme.trim_end_matches(['f', 'F', 'l', 'L']);
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("int main() { return 0; }"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::IntegerConstant,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integer_constant_is_decoded() {
        let tokens = tokenize("42;").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::IntegerConstant);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[0].literal, Some(Literal::Integer(42)));
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].lexeme, "");
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds("a += b <<= c ... d->e"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusEq,
                TokenKind::Identifier,
                TokenKind::LtLtEq,
                TokenKind::Identifier,
                TokenKind::Ellipsis,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_beats_identifier_only_on_equal_length() {
        let tokens = tokenize("if iffy int_ x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "iffy");
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_comments_and_positions() {
        let tokens = tokenize("int x; // comment\nint y; /* block\ncomment */ int z;").unwrap();
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| (t.lexeme.as_str(), t.location.line, t.location.column))
            .collect();
        assert_eq!(idents, vec![("x", 1, 5), ("y", 2, 5), ("z", 3, 16)]);
    }

    #[test]
    fn test_number_forms() {
        let tokens = tokenize("0x1F 017 10UL 1.5 .5e1 3e2f").unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Integer(31)));
        assert_eq!(tokens[1].literal, Some(Literal::Integer(15)));
        assert_eq!(tokens[2].literal, Some(Literal::Integer(10)));
        assert_eq!(tokens[3].literal, Some(Literal::Floating(1.5)));
        assert_eq!(tokens[4].literal, Some(Literal::Floating(5.0)));
        assert_eq!(tokens[5].literal, Some(Literal::Floating(300.0)));
    }

    #[test]
    fn test_string_and_char_literals() {
        let tokens = tokenize(r#""hello\nworld" '\n' 'a' '\x41' L"w""#).unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::String("hello\nworld".to_string())));
        assert_eq!(tokens[1].literal, Some(Literal::Character(10)));
        assert_eq!(tokens[2].literal, Some(Literal::Character(97)));
        assert_eq!(tokens[3].literal, Some(Literal::Character(65)));
        assert_eq!(tokens[4].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[4].lexeme, "L\"w\"");
    }

    #[test]
    fn test_line_splice_inside_string() {
        let tokens = tokenize("char *s = \"a\\\nb\";").unwrap();
        assert_eq!(tokens[4].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[4].literal, Some(Literal::String("ab".to_string())));
        assert_eq!(tokens[5].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].location, SourceLocation::new(2, 3));

        let tokens = tokenize("\"a\\\r\nb\"").unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::String("ab".to_string())));
    }

    #[test]
    fn test_preprocessor_skip() {
        let tokens = tokenize("#include <stdio.h>\nint x;").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].location.line, 2);
    }

    #[test]
    fn test_directives_rejected_when_not_skipped() {
        let config = Config::new().with_skip_directives(false);
        let err = Lexer::with_config("#define X 1\n", &config).tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_unknown_character_is_fatal() {
        let err = tokenize("int a = 1;\n  @").unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 3));
        assert!(err.message.contains('@'));
    }

    #[test]
    fn test_unterminated_constructs() {
        assert!(tokenize("/* never closed").is_err());
        assert!(tokenize("\"open string\n\"").is_err());
        assert!(tokenize("'a").is_err());
        assert!(tokenize("12abc").is_err());
    }
}
