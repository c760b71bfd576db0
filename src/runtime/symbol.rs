use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Name prefix that marks a keyword symbol
pub const KEYWORD_MARKER: char = ':';

/// Shared handle to a symbol; identity is pointer identity
pub type SymbolRef = Rc<Symbol>;

/// The three independent namespaces a symbol can be bound in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Ordinary variable value
    Variable,
    /// Function cell
    Function,
    /// Constant value (never overwritten once set)
    Constant,
}

#[derive(Default)]
struct Slots {
    variable: Option<Value>,
    function: Option<Value>,
    constant: Option<Value>,
}

/// A named symbol carrying up to three independent bindings
pub struct Symbol {
    name: Rc<str>,
    keyword: bool,
    slots: RefCell<Slots>,
}

impl Symbol {
    /// Creates an unbound symbol
    pub fn new(name: &str) -> Self {
        Symbol {
            name: Rc::from(name),
            keyword: name.starts_with(KEYWORD_MARKER),
            slots: RefCell::new(Slots::default()),
        }
    }

    /// Creates a symbol whose variable slot is already bound
    pub fn with_variable(name: &str, value: Value) -> Self {
        let sym = Symbol::new(name);
        sym.slots.borrow_mut().variable = Some(value);
        sym
    }

    /// Symbol name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared copy of the name, for use as a map key
    pub fn name_rc(&self) -> Rc<str> {
        self.name.clone()
    }

    /// True for `:name` symbols
    pub fn is_keyword(&self) -> bool {
        self.keyword
    }

    /// True when the symbol carries a constant binding or is a keyword
    pub fn is_constant(&self) -> bool {
        self.keyword || self.slots.borrow().constant.is_some()
    }

    /// Whether the given slot is bound
    pub fn is_bound(&self, kind: BindingKind) -> bool {
        let slots = self.slots.borrow();
        match kind {
            BindingKind::Variable => slots.variable.is_some(),
            BindingKind::Function => slots.function.is_some(),
            BindingKind::Constant => slots.constant.is_some(),
        }
    }

    /// Reads the given slot
    pub fn binding(&self, kind: BindingKind) -> Option<Value> {
        let slots = self.slots.borrow();
        match kind {
            BindingKind::Variable => slots.variable.clone(),
            BindingKind::Function => slots.function.clone(),
            BindingKind::Constant => slots.constant.clone(),
        }
    }

    /// Sets the variable slot; constants cannot be assigned
    pub fn set_variable(&self, value: Value) -> Result<()> {
        if self.is_constant() {
            return Err(Error::ConstantAssignment {
                name: self.name.to_string(),
            });
        }
        self.slots.borrow_mut().variable = Some(value);
        Ok(())
    }

    /// Sets the function slot
    pub fn set_function(&self, value: Value) {
        self.slots.borrow_mut().function = Some(value);
    }

    /// Installs the constant binding; a second installation is an error
    pub fn set_constant(&self, value: Value) -> Result<()> {
        if self.is_constant() {
            return Err(Error::ConstantAssignment {
                name: self.name.to_string(),
            });
        }
        self.slots.borrow_mut().constant = Some(value);
        Ok(())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

thread_local! {
    static NIL: SymbolRef = self_constant("nil");
    static T: SymbolRef = self_constant("t");
}

fn self_constant(name: &str) -> SymbolRef {
    let sym = Rc::new(Symbol::new(name));
    sym.slots.borrow_mut().constant = Some(Value::Symbol(sym.clone()));
    sym
}

/// The `nil` singleton for the current thread
pub fn nil_symbol() -> SymbolRef {
    NIL.with(Rc::clone)
}

/// The `t` singleton for the current thread
pub fn t_symbol() -> SymbolRef {
    T.with(Rc::clone)
}

/// Global name → symbol table
///
/// One table backs an evaluation session. `nil` and `t` are registered on
/// construction; every other symbol is created lazily by [`SymbolTable::intern`].
pub struct SymbolTable {
    symbols: IndexMap<Rc<str>, SymbolRef>,
}

impl SymbolTable {
    /// Creates a table holding only `nil` and `t`
    pub fn new() -> Self {
        let mut symbols = IndexMap::new();
        for sym in [nil_symbol(), t_symbol()] {
            symbols.insert(sym.name_rc(), sym);
        }
        SymbolTable { symbols }
    }

    /// Returns the symbol registered under `name`, creating it if needed
    pub fn intern(&mut self, name: &str) -> SymbolRef {
        if let Some(sym) = self.symbols.get(name) {
            return sym.clone();
        }
        let sym = Rc::new(Symbol::new(name));
        self.symbols.insert(sym.name_rc(), sym.clone());
        sym
    }

    /// Finds a symbol without creating it
    pub fn lookup(&self, name: &str) -> Option<SymbolRef> {
        self.symbols.get(name).cloned()
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the table holds no symbols
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Interned names in interning order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(|k| k.as_ref())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_returns_same_symbol() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_nil_and_t_preinterned() {
        let table = SymbolTable::new();
        let nil = table.lookup("nil").unwrap();
        assert!(Rc::ptr_eq(&nil, &nil_symbol()));
        assert!(nil.is_constant());
        assert!(table.lookup("t").unwrap().is_constant());
    }

    #[test]
    fn test_three_independent_slots() {
        let mut table = SymbolTable::new();
        let sym = table.intern("x");
        sym.set_variable(Value::Number(1.0)).unwrap();
        sym.set_function(Value::Number(2.0));

        assert_eq!(sym.binding(BindingKind::Variable), Some(Value::Number(1.0)));
        assert_eq!(sym.binding(BindingKind::Function), Some(Value::Number(2.0)));
        assert!(!sym.is_bound(BindingKind::Constant));
    }

    #[test]
    fn test_constant_cannot_be_assigned() {
        let mut table = SymbolTable::new();
        let sym = table.intern("pi");
        sym.set_constant(Value::Number(2.5)).unwrap();

        assert!(matches!(
            sym.set_variable(Value::Number(3.0)),
            Err(Error::ConstantAssignment { .. })
        ));
        assert!(matches!(
            sym.set_constant(Value::Number(3.0)),
            Err(Error::ConstantAssignment { .. })
        ));
        assert_eq!(sym.binding(BindingKind::Constant), Some(Value::Number(2.5)));
    }

    #[test]
    fn test_keywords_are_constant() {
        let mut table = SymbolTable::new();
        let kw = table.intern(":key");
        assert!(kw.is_keyword());
        assert!(kw.is_constant());
        assert!(table.intern(":").is_keyword());
        assert!(!table.intern("a:b").is_keyword());
    }
}
