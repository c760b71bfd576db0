use lazy_static::lazy_static;
use regex::Regex;

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

lazy_static! {
    /// Full numeric literal: optional sign, digits with optional fraction, optional exponent
    static ref NUMBER: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
    /// Atoms that start like a number and use number punctuation
    static ref NUMBER_LIKE: Regex = Regex::new(r"^[+-]?\.?\d[\d.eE+-]*$").unwrap();
}

/// True for characters allowed in a bare symbol or number
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "*&^%$@!~_+=./-<>:?".contains(c)
}

/// Scanner for S-expression source text
pub struct SExprScanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line and column where the current token starts
    start_line: usize,
    start_column: usize,
}

impl SExprScanner {
    /// Creates a new S-expression scanner from source code
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            self.column,
        ));

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' | '\n' => {}

            ';' => self.skip_line_comment(),

            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),

            '\'' => self.add_token(TokenKind::Quote),
            '`' => self.add_token(TokenKind::Backquote),
            ',' => {
                if self.match_char('@') {
                    self.add_token(TokenKind::CommaAt);
                } else {
                    self.add_token(TokenKind::Comma);
                }
            }
            '#' => {
                if self.match_char('\'') {
                    self.add_token(TokenKind::FunctionQuote);
                } else {
                    return Err(self.error("expected ' after #"));
                }
            }

            '"' => self.scan_string()?,

            c if is_symbol_char(c) => self.scan_atom()?,

            _ => return Err(self.error(&format!("unexpected character '{}'", c))),
        }

        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn scan_string(&mut self) -> Result<()> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    _ => {
                        return Err(self.error(&format!("invalid escape sequence \\{}", escaped)));
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(self.error("unterminated string"));
        }

        self.advance(); // Closing "

        self.add_token(TokenKind::String(value));
        Ok(())
    }

    fn scan_atom(&mut self) -> Result<()> {
        while is_symbol_char(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        let kind = if text == "." {
            TokenKind::Dot
        } else if NUMBER.is_match(&text) {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(&format!("invalid number {}", text)))?;
            TokenKind::Number(value)
        } else if NUMBER_LIKE.is_match(&text) && text.contains(['.', 'e', 'E']) {
            return Err(self.error(&format!("malformed number {}", text)));
        } else {
            TokenKind::Symbol(text)
        };

        self.add_token(kind);
        Ok(())
    }

    fn error(&self, message: &str) -> Error {
        Error::SyntaxError {
            line: self.start_line,
            col: self.start_column,
            message: message.to_string(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            kind,
            lexeme,
            self.start_line,
            self.start_column,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        SExprScanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn sym(name: &str) -> TokenKind {
        TokenKind::Symbol(name.to_string())
    }

    #[test]
    fn test_simple_sexpr() {
        assert_eq!(
            kinds("(+ 1 2)"),
            vec![
                TokenKind::LeftParen,
                sym("+"),
                TokenKind::Number(1.0),
                TokenKind::Number(2.0),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("-7")[0], TokenKind::Number(-7.0));
        assert_eq!(kinds("+2.5")[0], TokenKind::Number(2.5));
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
        assert_eq!(kinds("1e3")[0], TokenKind::Number(1000.0));
        assert_eq!(kinds("6.02E-2")[0], TokenKind::Number(0.0602));
    }

    #[test]
    fn test_number_like_symbols() {
        assert_eq!(kinds("1+")[0], sym("1+"));
        assert_eq!(kinds("1-")[0], sym("1-"));
        assert_eq!(kinds("-")[0], sym("-"));
        assert_eq!(kinds("let*")[0], sym("let*"));
        assert_eq!(kinds("&optional")[0], sym("&optional"));
        assert_eq!(kinds(":key")[0], sym(":key"));
    }

    #[test]
    fn test_malformed_numbers() {
        for source in ["1.2.3", "1e", "2e+"] {
            let result = SExprScanner::new(source).scan_tokens();
            assert!(
                matches!(result, Err(Error::SyntaxError { .. })),
                "{} should not scan",
                source
            );
        }
    }

    #[test]
    fn test_reader_sugar() {
        assert_eq!(
            kinds("'a #'f `(x ,y ,@z)")[..9],
            [
                TokenKind::Quote,
                sym("a"),
                TokenKind::FunctionQuote,
                sym("f"),
                TokenKind::Backquote,
                TokenKind::LeftParen,
                sym("x"),
                TokenKind::Comma,
                sym("y"),
            ]
        );
    }

    #[test]
    fn test_dot_and_string_escapes() {
        assert_eq!(
            kinds("(a . \"x\\n\\\"y\")"),
            vec![
                TokenKind::LeftParen,
                sym("a"),
                TokenKind::Dot,
                TokenKind::String("x\n\"y".to_string()),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_and_positions() {
        let tokens = SExprScanner::new("; comment\n  (car x)").scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LeftParen);
        assert_eq!((tokens[0].line, tokens[0].column), (2, 3));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 4));
    }

    #[test]
    fn test_unterminated_string() {
        let err = SExprScanner::new("\"abc").scan_tokens().unwrap_err();
        assert!(matches!(err, Error::SyntaxError { line: 1, col: 1, .. }));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(SExprScanner::new("(a [b])").scan_tokens().is_err());
        assert!(SExprScanner::new("#x").scan_tokens().is_err());
    }
}
