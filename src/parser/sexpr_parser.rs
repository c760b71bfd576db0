use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};
use crate::runtime::stack;
use crate::runtime::{SymbolTable, Value};

/// Deepest nesting of lists and quote forms the reader accepts
pub const MAX_NESTING: usize = 10_000;

/// S-expression parser producing expression trees.
///
/// Symbols are interned into the table supplied at construction, so a
/// parsed form can be evaluated by the evaluator owning that table.
pub struct SExprParser<'a> {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    symbols: &'a mut SymbolTable,
}

impl<'a> SExprParser<'a> {
    /// Creates a new S-expression parser
    pub fn new(mut tokens: Vec<Token>, symbols: &'a mut SymbolTable) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, String::new(), line, column));
        }
        SExprParser {
            tokens,
            current: 0,
            depth: 0,
            symbols,
        }
    }

    /// Parses every form up to end of input
    pub fn parse(&mut self) -> Result<Vec<Value>> {
        let mut forms = Vec::new();

        while !self.is_at_end() {
            forms.push(self.parse_expression()?);
        }

        Ok(forms)
    }

    /// Parses exactly one form; trailing input is an error
    pub fn parse_single(&mut self) -> Result<Value> {
        if self.is_at_end() {
            return Err(self.syntax_error("expected an expression, found end of input"));
        }
        let form = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self.syntax_error(format!(
                "unexpected {} after expression",
                self.peek().kind.describe()
            )));
        }
        Ok(form)
    }

    fn parse_expression(&mut self) -> Result<Value> {
        if self.depth >= MAX_NESTING {
            return Err(self.syntax_error(format!(
                "nesting deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let result = stack::guarded(|| self.parse_form());
        self.depth -= 1;
        result
    }

    fn parse_form(&mut self) -> Result<Value> {
        let token = self.advance();
        match &token.kind {
            TokenKind::LeftParen => self.parse_list(&token),
            TokenKind::Quote => self.parse_sugar("quote"),
            TokenKind::FunctionQuote => self.parse_sugar("function"),
            TokenKind::Backquote => self.parse_sugar("backquote"),
            TokenKind::Comma => self.parse_sugar("unquote"),
            TokenKind::CommaAt => self.parse_sugar("unquote-splicing"),
            TokenKind::String(s) => Ok(Value::string(s)),
            TokenKind::Number(n) => Ok(Value::Number(*n)),
            TokenKind::Symbol(name) => Ok(Value::Symbol(self.symbols.intern(name))),
            TokenKind::RightParen => Err(error_at(&token, "unexpected ')'")),
            TokenKind::Dot => Err(error_at(&token, "unexpected '.' outside a list")),
            TokenKind::Eof => Err(error_at(&token, "unexpected end of input")),
        }
    }

    /// Parses the remainder of a list whose `(` was already consumed
    fn parse_list(&mut self, open: &Token) -> Result<Value> {
        let mut items = Vec::new();

        loop {
            match self.peek().kind {
                TokenKind::RightParen => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                TokenKind::Eof => return Err(error_at(open, "unterminated list")),
                TokenKind::Dot => {
                    if items.is_empty() {
                        return Err(self.syntax_error("'.' must follow at least one element"));
                    }
                    self.advance();
                    if matches!(self.peek().kind, TokenKind::RightParen | TokenKind::Eof) {
                        return Err(self.syntax_error("expected an expression after '.'"));
                    }
                    let tail = self.parse_expression()?;
                    return match self.peek().kind {
                        TokenKind::RightParen => {
                            self.advance();
                            Ok(Value::list_with_tail(items, tail))
                        }
                        TokenKind::Eof => Err(error_at(open, "unterminated list")),
                        _ => Err(self.syntax_error("expected ')' after dotted tail")),
                    };
                }
                _ => items.push(self.parse_expression()?),
            }
        }
    }

    /// `'x` and friends: `(name x)`
    fn parse_sugar(&mut self, name: &str) -> Result<Value> {
        let head = Value::Symbol(self.symbols.intern(name));
        let form = self.parse_expression()?;
        Ok(Value::list(vec![head, form]))
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn syntax_error(&self, message: impl Into<String>) -> Error {
        error_at(self.peek(), message)
    }
}

fn error_at(token: &Token, message: impl Into<String>) -> Error {
    Error::SyntaxError {
        line: token.line,
        col: token.column,
        message: message.into(),
    }
}
