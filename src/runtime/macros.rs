//! Macro table and one-step expansion
//!
//! Macros live in their own table, disjoint from function bindings, and
//! are looked up by call-head name before builtins and user functions.
//! Expansion is never memoized: every evaluation of a macro call runs
//! the macro body again.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::Result;
use crate::runtime::environment::FrameKind;
use crate::runtime::value::Closure;
use crate::runtime::{LispEvaluator, Value};

/// A macro definition: a closure run on unevaluated argument forms
pub struct MacroDefinition {
    closure: Rc<Closure>,
    expansion_count: Cell<usize>,
}

impl MacroDefinition {
    /// Wraps a closure built by `defmacro`
    pub fn new(closure: Rc<Closure>) -> Self {
        MacroDefinition {
            closure,
            expansion_count: Cell::new(0),
        }
    }

    /// The macro's expander closure
    pub fn closure(&self) -> &Rc<Closure> {
        &self.closure
    }

    /// Number of times this macro has been expanded
    pub fn expansion_count(&self) -> usize {
        self.expansion_count.get()
    }

    fn record_expansion(&self) {
        self.expansion_count.set(self.expansion_count.get() + 1);
    }
}

impl fmt::Debug for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MacroDefinition {{ name: {}, expansions: {} }}",
            self.closure.display_name(),
            self.expansion_count()
        )
    }
}

/// Name → macro definition, in definition order
#[derive(Default)]
pub struct MacroTable {
    macros: IndexMap<Rc<str>, Rc<MacroDefinition>>,
}

impl MacroTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) a macro
    pub fn define(&mut self, name: Rc<str>, closure: Rc<Closure>) {
        self.macros
            .insert(name, Rc::new(MacroDefinition::new(closure)));
    }

    /// Looks up a macro by name
    pub fn get(&self, name: &str) -> Option<Rc<MacroDefinition>> {
        self.macros.get(name).cloned()
    }

    /// True when `name` names a macro
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Number of defined macros
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// True when no macro is defined
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Macro names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(|k| k.as_ref())
    }
}

/// Runs a macro body on the unevaluated argument forms of a call.
///
/// The body runs as a barrier activation over the macro's captured chain;
/// the returned form is the expansion, not yet evaluated.
pub fn expand_once(
    eval: &mut LispEvaluator,
    definition: &MacroDefinition,
    args_form: &Value,
) -> Result<Value> {
    let args = args_form.to_vec()?;
    definition.record_expansion();
    trace!(
        name = definition.closure.display_name(),
        count = definition.expansion_count(),
        "expanding macro"
    );
    let closure = definition.closure.clone();
    eval.apply_closure(&closure, args, FrameKind::Barrier)
}

/// Expands `form` once when its head names a macro; otherwise returns it unchanged
pub fn macroexpand_1(eval: &mut LispEvaluator, form: &Value) -> Result<Value> {
    let Value::Pair(pair) = form else {
        return Ok(form.clone());
    };
    let definition = match pair.head().symbol_name() {
        Some(name) => eval.macros.get(name),
        None => None,
    };
    match definition {
        Some(definition) => expand_once(eval, &definition, &pair.tail()),
        None => Ok(form.clone()),
    }
}
