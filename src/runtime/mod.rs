//! Runtime execution for mispli programs using LISP-style evaluation

pub mod binder;
pub mod builtins;
pub mod environment;
mod lisp_evaluator;
pub mod macros;
pub mod prelude;
pub mod printer;
pub mod special_forms;
pub mod stack;
pub mod symbol;
pub mod value;

pub use environment::{CallStack, Frame, FrameKind};
pub use lisp_evaluator::{EvaluatorConfig, LispEvaluator, DEFAULT_MAX_DEPTH, MAX_DEPTH_ENV};
pub use symbol::{BindingKind, Symbol, SymbolRef, SymbolTable};
pub use value::{Closure, PairRef, Value};
