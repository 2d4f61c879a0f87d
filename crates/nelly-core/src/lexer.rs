//! Converts script text into a flat token stream.
//!
//! Whitespace (including newlines) and `//` comments are discarded. Keywords
//! win over identifiers, and a `[v]INT.INT.INT[-PRE][+BUILD]` shape is read as
//! a single semver token before number or identifier rules get a chance.

use crate::ast::Semver;
use crate::error::ParseError;
use crate::token::{lookup_keyword, Position, Token, TokenKind};

/// Tokenizes `source`. The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>, pos: Position) -> ParseError {
        ParseError::Lex {
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, pos: Position) {
        let literal = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token { kind, literal, pos });
    }

    /// A sign only belongs to a number where an operand is expected.
    fn operand_expected(&self) -> bool {
        self.tokens.last().map_or(true, |t| !t.kind.ends_operand())
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            let pos = self.position();
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => self.skip_line(),
                '#' => {
                    self.bump();
                    if self.peek() != Some('!') {
                        return Err(self.error("expected '!' after '#'", pos));
                    }
                    self.bump();
                    let body = self.read_header_body();
                    self.push(TokenKind::Header(body), start, pos);
                    self.skip_line();
                }
                '"' => {
                    let s = self.read_string(pos)?;
                    self.push(TokenKind::Str(s), start, pos);
                }
                c if c.is_ascii_digit() && self.scan_semver(self.pos).is_some() => {
                    let version = self
                        .read_semver(self.pos)
                        .ok_or_else(|| self.error("version component out of range", pos))?;
                    self.push(TokenKind::Semver(version), start, pos);
                }
                c if c.is_ascii_digit() => {
                    let n = self.read_number(pos)?;
                    self.push(TokenKind::Number(n), start, pos);
                }
                'v' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
                    && self.scan_semver(self.pos + 1).is_some() =>
                {
                    self.bump();
                    let version = self
                        .read_semver(self.pos)
                        .ok_or_else(|| self.error("version component out of range", pos))?;
                    self.push(TokenKind::Semver(version), start, pos);
                }
                '+' | '-' | '.' if self.operand_expected() && self.starts_number() => {
                    let n = self.read_number(pos)?;
                    self.push(TokenKind::Number(n), start, pos);
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            ident.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let kind = lookup_keyword(&ident).unwrap_or(TokenKind::Ident(ident));
                    self.push(kind, start, pos);
                }
                _ => {
                    let kind = self.read_symbol(ch, pos)?;
                    self.push(kind, start, pos);
                }
            }
        }

        let pos = self.position();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            literal: String::new(),
            pos,
        });
        Ok(self.tokens)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Reads the header up to end of line or a trailing comment. A `//` only
    /// opens a comment outside quotes and after whitespace, so URL schemes
    /// such as `https://` stay in the body.
    fn read_header_body(&mut self) -> String {
        let mut body = String::new();
        let mut quoted = false;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            if c == '"' {
                quoted = !quoted;
            }
            if c == '/'
                && !quoted
                && self.peek_at(1) == Some('/')
                && body.chars().last().map_or(true, char::is_whitespace)
            {
                break;
            }
            body.push(c);
            self.bump();
        }
        body
    }

    fn read_symbol(&mut self, ch: char, pos: Position) -> Result<TokenKind, ParseError> {
        self.bump();
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' if self.eat('=') => TokenKind::EqEq,
            '=' => TokenKind::Assign,
            '!' if self.eat('=') => TokenKind::NotEq,
            '<' if self.eat('=') => TokenKind::LtEq,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '&' if self.eat('&') => TokenKind::AndAnd,
            '|' if self.eat('|') => TokenKind::OrOr,
            other => {
                return Err(self.error(format!("unexpected character '{}'", other), pos));
            }
        };
        Ok(kind)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn read_string(&mut self, pos: Position) -> Result<String, ParseError> {
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(s),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('0') => s.push('\0'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some(c) => {
                        s.push('\\');
                        s.push(c);
                    }
                    None => return Err(self.error("unterminated string", pos)),
                },
                Some(c) => s.push(c),
                None => return Err(self.error("unterminated string", pos)),
            }
        }
    }

    /// Whether a signed or dot-leading number starts at the cursor.
    fn starts_number(&self) -> bool {
        let mut offset = 0;
        if matches!(self.peek(), Some('+') | Some('-')) {
            offset = 1;
        }
        match self.peek_at(offset) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_at(offset + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn read_number(&mut self, pos: Position) -> Result<f64, ParseError> {
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            text.push(sign);
            self.bump();
        }
        self.take_digits(&mut text);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.bump();
            self.take_digits(&mut text);
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                self.take_digits(&mut text);
            }
        }
        text.parse::<f64>()
            .map_err(|_| self.error(format!("invalid number: {}", text), pos))
    }

    fn take_digits(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            out.push(c);
            self.bump();
        }
    }

    /// Returns the end index of a `INT.INT.INT[-PRE][+BUILD]` shape starting
    /// at `at`, without consuming anything.
    fn scan_semver(&self, at: usize) -> Option<usize> {
        let digits = |mut i: usize| -> Option<usize> {
            let begin = i;
            while self.chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
            (i > begin).then_some(i)
        };
        let mut i = digits(at)?;
        for _ in 0..2 {
            if self.chars.get(i) != Some(&'.') {
                return None;
            }
            i = digits(i + 1)?;
        }
        for marker in ['-', '+'] {
            if self.chars.get(i) == Some(&marker)
                && self.chars.get(i + 1).is_some_and(|c| c.is_ascii_alphanumeric())
            {
                i += 1;
                while self
                    .chars
                    .get(i)
                    .is_some_and(|&c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
                {
                    i += 1;
                }
            }
        }
        Some(i)
    }

    fn read_semver(&mut self, at: usize) -> Option<Semver> {
        let end = self.scan_semver(at)?;
        let text: String = self.chars[at..end].iter().collect();
        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => (rest, Some(build.to_string())),
            None => (text.as_str(), None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (rest, None),
        };
        let mut parts = core.split('.').map(|p| p.parse::<u64>().ok());
        let version = Semver {
            major: parts.next()??,
            minor: parts.next()??,
            patch: parts.next()??,
            pre,
            build,
        };
        while self.pos < end {
            self.bump();
        }
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_win_over_identifiers() {
        assert_eq!(
            kinds("let for in if else true false letter"),
            vec![
                TokenKind::Let,
                TokenKind::For,
                TokenKind::In,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Ident("letter".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.5 1e3 2.5E-2"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.025),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds(".25"), vec![TokenKind::Number(0.25), TokenKind::Eof]);
    }

    #[test]
    fn test_sign_belongs_to_number_only_where_operand_expected() {
        assert_eq!(
            kinds("let x = -3"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(-3.0),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a-1"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Minus,
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("2 * -1"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Number(-1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n" "c\\d""#),
            vec![
                TokenKind::Str("a\"b\n".to_string()),
                TokenKind::Str("c\\d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_lex_error() {
        let err = tokenize("let s = \"open").unwrap_err();
        assert!(matches!(err, ParseError::Lex { line: 1, column: 9, .. }));
    }

    #[test]
    fn test_semver_is_single_token() {
        let v = |major, minor, patch, pre: Option<&str>, build: Option<&str>| {
            TokenKind::Semver(Semver {
                major,
                minor,
                patch,
                pre: pre.map(str::to_string),
                build: build.map(str::to_string),
            })
        };
        assert_eq!(
            kinds("1.2.3 v10.0.1 v1.0.0-rc.1 2.0.0+build.7 3.1.4-beta+exp.sha.5114f85"),
            vec![
                v(1, 2, 3, None, None),
                v(10, 0, 1, None, None),
                v(1, 0, 0, Some("rc.1"), None),
                v(2, 0, 0, None, Some("build.7")),
                v(3, 1, 4, Some("beta"), Some("exp.sha.5114f85")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_v_prefixed_identifier_without_version_shape() {
        assert_eq!(
            kinds("v1 version"),
            vec![
                TokenKind::Ident("v1".to_string()),
                TokenKind::Ident("version".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= < > && || + - * /"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_discarded() {
        assert_eq!(
            kinds("// leading\nx // trailing\n"),
            vec![TokenKind::Ident("x".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_header_token_takes_rest_of_line() {
        let tokens = tokenize("#! https://example.com/r.git: main\nlet x = 1").unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Header(" https://example.com/r.git: main".to_string())
        );
        assert_eq!(tokens[1].kind, TokenKind::Let);
        assert_eq!(tokens[1].pos, Position { line: 2, column: 1 });
    }

    #[test]
    fn test_header_stops_at_trailing_comment() {
        let tokens = tokenize("#! myrepo : main // bootstrap\nlet x = 1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Header(" myrepo : main ".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Let);

        // Scheme slashes and quoted slashes are part of the body
        let tokens = tokenize("#! \"a //b\" : dev //x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Header(" \"a //b\" : dev ".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_semver_overflow_is_lex_error() {
        for source in ["99999999999999999999.0.0", "let v = v1.99999999999999999999.0"] {
            match tokenize(source).unwrap_err() {
                ParseError::Lex { message, .. } => {
                    assert_eq!(message, "version component out of range")
                }
                other => panic!("Expected Lex error, got {:?}", other),
            }
        }
        let err = tokenize("99999999999999999999.0.0").unwrap_err();
        assert!(matches!(err, ParseError::Lex { line: 1, column: 1, .. }));
    }

    #[test]
    fn test_unexpected_character_reports_position() {
        let err = tokenize("let x = 1\nlet y = @").unwrap_err();
        assert_eq!(
            err,
            ParseError::Lex {
                message: "unexpected character '@'".to_string(),
                line: 2,
                column: 9,
            }
        );
    }

    #[test]
    fn test_lone_bang_is_error() {
        assert!(tokenize("!x").is_err());
        assert!(tokenize("a & b").is_err());
    }
}
