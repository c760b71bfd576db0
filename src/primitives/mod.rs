//! Primitive function library for mispli
//!
//! Primitives are builtins that never re-enter the evaluator: they receive
//! already-evaluated arguments and a [`PrimitiveContext`] giving access to
//! the session's output sink and symbol table.

pub mod stdlib;

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::{SymbolTable, Value};

/// Session state a primitive may touch
pub struct PrimitiveContext<'a> {
    /// Output sink for printing primitives
    pub output: &'a mut dyn Write,
    /// Global symbol table (for `intern`)
    pub symbols: &'a mut SymbolTable,
}

/// Primitive trait - every builtin function in the library implements this
pub trait Primitive: Send + Sync {
    /// Name the primitive is called by
    fn name(&self) -> &str;

    /// Primitive description
    fn description(&self) -> &str;

    /// Execute the primitive on evaluated arguments
    fn execute(&self, ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value>;

    /// Exact number of arguments, if fixed
    fn arity(&self) -> Option<usize> {
        None // None means variadic
    }
}

/// Primitive registry
pub struct PrimitiveRegistry {
    primitives: HashMap<String, Arc<dyn Primitive>>,
}

impl PrimitiveRegistry {
    /// Create new registry with the standard library
    pub fn new() -> Self {
        let mut registry = PrimitiveRegistry::empty();
        stdlib::register_all(&mut registry);
        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        PrimitiveRegistry {
            primitives: HashMap::new(),
        }
    }

    /// Register a primitive, replacing any previous one with the same name
    pub fn register<P: Primitive + 'static>(&mut self, primitive: P) {
        let name = primitive.name().to_string();
        self.primitives.insert(name, Arc::new(primitive));
    }

    /// Get primitive by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Primitive>> {
        self.primitives.get(name).cloned()
    }

    /// Check if a primitive exists
    pub fn has(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }

    /// Checks the declared arity, then runs the primitive
    pub fn call(
        &self,
        name: &str,
        ctx: &mut PrimitiveContext<'_>,
        args: &[Value],
    ) -> Result<Value> {
        let primitive = self.get(name).ok_or_else(|| Error::UndefinedFunction {
            name: name.to_string(),
        })?;
        check_arity(primitive.as_ref(), args)?;
        primitive.execute(ctx, args)
    }

    /// List all primitive names, sorted
    pub fn list_primitives(&self) -> Vec<String> {
        let mut names: Vec<_> = self.primitives.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get primitive count
    pub fn count(&self) -> usize {
        self.primitives.len()
    }
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arity(primitive: &dyn Primitive, args: &[Value]) -> Result<()> {
    match primitive.arity() {
        Some(expected) if expected != args.len() => Err(Error::ArityError {
            name: primitive.name().to_string(),
            expected: format!("exactly {}", expected),
            got: args.len(),
        }),
        _ => Ok(()),
    }
}

/// Arity error for variadic primitives that need at least `min` arguments
pub(crate) fn require_at_least(name: &str, min: usize, args: &[Value]) -> Result<()> {
    if args.len() < min {
        return Err(Error::ArityError {
            name: name.to_string(),
            expected: format!("at least {}", min),
            got: args.len(),
        });
    }
    Ok(())
}
