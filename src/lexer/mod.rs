//! Lexical analysis for mispli
//!
//! Converts source text into a stream of tokens for the S-expression reader.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::{is_symbol_char, SExprScanner};
pub use token::{Token, TokenKind};
