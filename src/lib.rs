//! # Mispli - A small Emacs-Lisp-flavoured interpreter
//!
//! Mispli reads S-expressions and evaluates them against a session that
//! owns a global symbol table, a frame stack and a macro table.
//!
//! ## Features
//!
//! - Symbols with separate variable, function and constant bindings
//! - Lexical closures alongside declared dynamic (special) variables
//! - `defmacro` with backquote templates and `macroexpand`
//! - `&optional` and `&rest` parameters
//! - Bounded evaluation depth with a recoverable error
//!
//! ## Quick Start
//!
//! ```rust
//! use mispli::{Evaluator, Value};
//!
//! # fn main() -> mispli::Result<()> {
//! let code = r#"
//!     (setq sum 0)
//!     (setq i 1)
//!     (while (<= i 10)
//!       (setq sum (+ sum i))
//!       (setq i (1+ i)))
//!     sum
//! "#;
//!
//! let mut evaluator = Evaluator::new();
//! let result = evaluator.eval_str(code)?;
//!
//! assert_eq!(result, Value::Number(55.0)); // Sum of 1-10
//! # Ok(())
//! # }
//! ```
//!
//! ### Scanning and parsing by hand
//!
//! ```rust
//! use mispli::runtime::SymbolTable;
//! use mispli::{Parser, Scanner};
//!
//! # fn main() -> mispli::Result<()> {
//! let mut scanner = Scanner::new("(a . b) 'c");
//! let tokens = scanner.scan_tokens()?;
//!
//! let mut symbols = SymbolTable::new();
//! let forms = Parser::new(tokens, &mut symbols).parse()?;
//!
//! assert_eq!(forms.len(), 2);
//! assert_eq!(forms[1].to_string(), "(quote c)");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Values → Evaluator → Value
//! ```
//!
//! - [`Scanner`] - Tokenizes source code
//! - [`Parser`] - Builds values from tokens, interning symbols
//! - [`Evaluator`] - Evaluates forms against the session state
//! - [`Value`] - Runtime value representation
//! - [`primitives::PrimitiveRegistry`] - Built-in functions
//!
//! ## Error Handling
//!
//! ```rust
//! # use mispli::{Error, Evaluator};
//! let mut evaluator = Evaluator::new();
//!
//! match evaluator.eval_str("(/ 10 0)") {
//!     Ok(_) => panic!("Should have failed"),
//!     Err(e) => {
//!         assert!(matches!(e, Error::DivisionByZero));
//!         assert!(e.to_string().contains("Division by zero"));
//!     }
//! }
//! ```

/// Version of the mispli interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod primitives;
pub mod runtime;

// Re-export main types
pub use error::{Error, Result};
pub use lexer::{SExprScanner, Token, TokenKind};
pub use parser::SExprParser;
pub use runtime::{EvaluatorConfig, LispEvaluator, Value};

/// Type alias for the S-expression scanner (lexer).
pub type Scanner = SExprScanner;

/// Type alias for the S-expression parser.
pub type Parser<'a> = SExprParser<'a>;

/// Type alias for the LISP evaluator (interpreter).
pub type Evaluator = LispEvaluator;
