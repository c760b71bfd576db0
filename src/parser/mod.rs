//! mispli reader
//!
//! Parses token streams into expression trees, interning symbols as it goes.

mod sexpr_parser;

pub use sexpr_parser::{SExprParser, MAX_NESTING};
