use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token starts (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

/// All token types of the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// `.` standing alone, separating the tail of a dotted pair
    Dot,

    // Reader sugar
    /// ' (quote)
    Quote,
    /// #' (function)
    FunctionQuote,
    /// ` (backquote)
    Backquote,
    /// , (unquote)
    Comma,
    /// ,@ (unquote-splicing)
    CommaAt,

    // Atoms
    /// String literal with escapes already resolved
    String(String),
    /// Numeric literal
    Number(f64),
    /// Symbol name
    Symbol(String),

    /// End of file
    Eof,
}

impl TokenKind {
    /// Short description used in syntax errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Quote => "'''".to_string(),
            TokenKind::FunctionQuote => "\"#'\"".to_string(),
            TokenKind::Backquote => "'`'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::CommaAt => "',@'".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Symbol(name) => format!("symbol {}", name),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}
