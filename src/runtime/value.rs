use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::binder::ParamList;
use crate::runtime::environment::Frame;
use crate::runtime::printer;
use crate::runtime::stack;
use crate::runtime::symbol::{nil_symbol, t_symbol, SymbolRef};

/// Runtime value representation
///
/// Atoms are symbols, strings, numbers and closures; everything else is
/// built from pairs. A proper list is a chain of pairs ending in `nil`.
#[derive(Clone)]
pub enum Value {
    /// Interned (or frame-local) symbol
    Symbol(SymbolRef),
    /// Immutable string
    String(Rc<str>),
    /// 64-bit floating-point number (the only numeric type)
    Number(f64),
    /// Function value produced by `lambda`, `defun` or `defmacro`
    Closure(Rc<Closure>),
    /// Mutable cons cell
    Pair(PairRef),
}

/// Contents of a cons cell
pub struct Pair {
    /// First slot (car)
    pub head: Value,
    /// Second slot (cdr)
    pub tail: Value,
}

impl Drop for Pair {
    // Unlinks uniquely owned cells into a worklist so that releasing a long
    // or deeply nested structure does not recurse once per cell
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach(&mut self.head, &mut pending);
        detach(&mut self.tail, &mut pending);
        while let Some(mut pair) = pending.pop() {
            detach(&mut pair.head, &mut pending);
            detach(&mut pair.tail, &mut pending);
        }
    }
}

/// Moves the cell in `slot` onto `pending` when this is its last reference
fn detach(slot: &mut Value, pending: &mut Vec<Pair>) {
    if !matches!(slot, Value::Pair(_)) {
        return;
    }
    if let Value::Pair(PairRef(cell)) = std::mem::replace(slot, Value::Number(0.0)) {
        if let Ok(cell) = Rc::try_unwrap(cell) {
            pending.push(cell.into_inner());
        }
    }
}

/// Shared, in-place mutable handle to a cons cell
#[derive(Clone)]
pub struct PairRef(Rc<RefCell<Pair>>);

impl PairRef {
    /// Allocates a new cell
    pub fn new(head: Value, tail: Value) -> Self {
        PairRef(Rc::new(RefCell::new(Pair { head, tail })))
    }

    /// Current head (car)
    pub fn head(&self) -> Value {
        self.0.borrow().head.clone()
    }

    /// Current tail (cdr)
    pub fn tail(&self) -> Value {
        self.0.borrow().tail.clone()
    }

    /// Replaces the head in place
    pub fn set_head(&self, value: Value) {
        self.0.borrow_mut().head = value;
    }

    /// Replaces the tail in place
    pub fn set_tail(&self, value: Value) {
        self.0.borrow_mut().tail = value;
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &PairRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the cell, used as an identity key for cycle detection
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// A function value: parameter list, body and the frames captured at creation
pub struct Closure {
    /// Name given by `defun`/`defmacro`; `None` for anonymous lambdas
    pub name: Option<Rc<str>>,
    /// Parsed parameter list
    pub params: ParamList,
    /// Body forms, with any leading `declare` form removed
    pub body: Vec<Value>,
    /// Parameter names declared `special` in the body
    pub specials: Vec<Rc<str>>,
    /// Frames lexically reachable from the definition point (outermost first)
    pub captured: Vec<Frame>,
}

impl Closure {
    /// Name used in diagnostics
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("lambda")
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.display_name())
            .field("params", &self.params)
            .field("captured_frames", &self.captured.len())
            .finish()
    }
}

impl Value {
    /// The `nil` symbol
    pub fn nil() -> Self {
        Value::Symbol(nil_symbol())
    }

    /// The `t` symbol
    pub fn t() -> Self {
        Value::Symbol(t_symbol())
    }

    /// `t` for true, `nil` for false
    pub fn bool(b: bool) -> Self {
        if b {
            Value::t()
        } else {
            Value::nil()
        }
    }

    /// Creates a string value
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// Allocates a cons cell
    pub fn cons(head: Value, tail: Value) -> Self {
        Value::Pair(PairRef::new(head, tail))
    }

    /// Builds a proper list from the given items
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::list_with_tail(items, Value::nil())
    }

    /// Builds a list whose final tail is `tail` (a dotted list unless `tail` is nil)
    pub fn list_with_tail<I>(items: I, tail: Value) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Value::cons(item, acc))
    }

    /// True for the `nil` symbol
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Symbol(sym) if Rc::ptr_eq(sym, &nil_symbol()))
    }

    /// Everything except `nil` is true
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// True for anything that is not a pair
    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::Pair(_))
    }

    /// True for `nil` or a pair
    pub fn is_list(&self) -> bool {
        self.is_nil() || matches!(self, Value::Pair(_))
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Symbol(_) => "symbol",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Closure(_) => "closure",
            Value::Pair(_) => "cons",
        }
    }

    /// The symbol handle, if this is a symbol
    pub fn as_symbol(&self) -> Option<&SymbolRef> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// The symbol handle, or a type error naming `what` was expected
    pub fn expect_symbol(&self, what: &str) -> Result<&SymbolRef> {
        self.as_symbol()
            .ok_or_else(|| Error::type_error(what, printer::render(self)))
    }

    /// The symbol's name, if this is a symbol
    pub fn symbol_name(&self) -> Option<&str> {
        self.as_symbol().map(|sym| sym.name())
    }

    /// True for a symbol with exactly this name
    pub fn is_symbol_named(&self, name: &str) -> bool {
        self.symbol_name() == Some(name)
    }

    /// The pair handle, if this is a pair
    pub fn as_pair(&self) -> Option<&PairRef> {
        match self {
            Value::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Converts value to a number
    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(Error::type_error("number", printer::render(self))),
        }
    }

    /// Converts value to a string slice
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::type_error("string", printer::render(self))),
        }
    }

    /// Head of a pair; `nil` for `nil`; type error otherwise
    pub fn car(&self) -> Result<Value> {
        match self {
            Value::Pair(pair) => Ok(pair.head()),
            _ if self.is_nil() => Ok(Value::nil()),
            _ => Err(Error::type_error("list", printer::render(self))),
        }
    }

    /// Tail of a pair; `nil` for `nil`; type error otherwise
    pub fn cdr(&self) -> Result<Value> {
        match self {
            Value::Pair(pair) => Ok(pair.tail()),
            _ if self.is_nil() => Ok(Value::nil()),
            _ => Err(Error::type_error("list", printer::render(self))),
        }
    }

    /// Collects the elements of a proper list.
    ///
    /// Dotted and circular lists are rejected with a type error.
    pub fn to_vec(&self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut current = self.clone();
        let mut slow = self.clone();
        loop {
            match current {
                Value::Pair(pair) => {
                    items.push(pair.head());
                    current = pair.tail();
                }
                ref other if other.is_nil() => return Ok(items),
                _ => return Err(Error::type_error("proper list", printer::render(self))),
            }
            // Floyd: the slow cursor advances every second step
            if items.len() % 2 == 0 {
                slow = slow.cdr()?;
                if let (Value::Pair(a), Value::Pair(b)) = (&slow, &current) {
                    if a.ptr_eq(b) {
                        return Err(Error::type_error("proper list", "circular list"));
                    }
                }
            }
        }
    }

    /// Identity comparison (`eq`)
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Structural equality (`equal`); terminates on cyclic structure
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut seen = HashSet::new();
        equal(self, other, &mut seen)
    }
}

fn equal(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Symbol(x), Value::Symbol(y)) => Rc::ptr_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Pair(x), Value::Pair(y)) => {
            let (mut x, mut y) = (x.clone(), y.clone());
            loop {
                // A pair of cells already under comparison is assumed equal
                if x.ptr_eq(&y) || !seen.insert((x.addr(), y.addr())) {
                    return true;
                }
                if !stack::guarded(|| equal(&x.head(), &y.head(), seen)) {
                    return false;
                }
                match (x.tail(), y.tail()) {
                    (Value::Pair(nx), Value::Pair(ny)) => {
                        x = nx;
                        y = ny;
                    }
                    (tx, ty) => return equal(&tx, &ty, seen),
                }
            }
        }
        _ => false,
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::render(self))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::render(self))
    }
}
