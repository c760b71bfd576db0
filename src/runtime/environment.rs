use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runtime::symbol::{BindingKind, Symbol, SymbolRef, SymbolTable};
use crate::runtime::Value;

/// Shared name → binding map; frame copies alias the same map
pub type Scope = Rc<RefCell<IndexMap<Rc<str>, SymbolRef>>>;

/// Whether lexical search continues past a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Outermost frame of an activation; lexical search stops after it
    Barrier,
    /// Lexical search continues into the enclosing frame
    Transparent,
}

/// One environment frame: lexical locals plus declared dynamic bindings
#[derive(Clone)]
pub struct Frame {
    kind: FrameKind,
    locals: Scope,
    dynamics: Scope,
}

impl Frame {
    /// Creates an empty frame
    pub fn new(kind: FrameKind) -> Self {
        Frame {
            kind,
            locals: Rc::new(RefCell::new(IndexMap::new())),
            dynamics: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// Frame kind
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// A copy sharing this frame's maps, tagged with `kind`
    pub fn retagged(&self, kind: FrameKind) -> Frame {
        Frame {
            kind,
            locals: self.locals.clone(),
            dynamics: self.dynamics.clone(),
        }
    }

    /// True when both frames alias the same maps
    pub fn shares_maps(&self, other: &Frame) -> bool {
        Rc::ptr_eq(&self.locals, &other.locals)
    }

    /// Binds `name` to a fresh local symbol holding `value`
    pub fn bind(&self, name: &str, value: Value) -> SymbolRef {
        let sym = Rc::new(Symbol::with_variable(name, value));
        self.locals.borrow_mut().insert(sym.name_rc(), sym.clone());
        sym
    }

    /// Moves `name` from the locals into the dynamics map.
    ///
    /// A name with no local binding gets a fresh dynamic binding to `nil`.
    pub fn promote_special(&self, name: &str) {
        let sym = self
            .locals
            .borrow_mut()
            .shift_remove(name)
            .unwrap_or_else(|| Rc::new(Symbol::with_variable(name, Value::nil())));
        self.dynamics.borrow_mut().insert(sym.name_rc(), sym);
    }

    /// Local binding for `name`
    pub fn local(&self, name: &str) -> Option<SymbolRef> {
        self.locals.borrow().get(name).cloned()
    }

    /// Dynamic binding for `name`
    pub fn dynamic(&self, name: &str) -> Option<SymbolRef> {
        self.dynamics.borrow().get(name).cloned()
    }

    /// Names bound in the locals map, in binding order
    pub fn local_names(&self) -> Vec<Rc<str>> {
        self.locals.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("locals", &self.local_names())
            .field(
                "dynamics",
                &self.dynamics.borrow().keys().cloned().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Ordered sequence of active frames, innermost last
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    /// Creates an empty stack
    pub fn new() -> Self {
        CallStack { frames: Vec::new() }
    }

    /// Number of active frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame is active
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost frame
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Active frames, outermost first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Pushes a frame
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pops frames until at most `height` remain
    pub fn truncate(&mut self, height: usize) {
        self.frames.truncate(height);
    }

    /// Pushes the frames of one activation and returns its innermost frame.
    ///
    /// A barrier activation restores `captured` underneath a fresh call
    /// frame; its outermost frame is the barrier. A transparent activation
    /// pushes only the fresh frame and keeps the enclosing chain visible.
    pub fn push_activation(&mut self, captured: &[Frame], kind: FrameKind) -> Frame {
        let frame_kind = match kind {
            FrameKind::Barrier => {
                for (i, frame) in captured.iter().enumerate() {
                    let kind = if i == 0 {
                        FrameKind::Barrier
                    } else {
                        FrameKind::Transparent
                    };
                    self.frames.push(frame.retagged(kind));
                }
                if captured.is_empty() {
                    FrameKind::Barrier
                } else {
                    FrameKind::Transparent
                }
            }
            FrameKind::Transparent => FrameKind::Transparent,
        };
        let frame = Frame::new(frame_kind);
        self.frames.push(frame.clone());
        frame
    }

    /// Copies the lexically reachable frames, outermost first.
    ///
    /// Copies are tagged transparent and share the originals' maps.
    pub fn capture(&self) -> Vec<Frame> {
        let mut captured = Vec::new();
        for frame in self.frames.iter().rev() {
            captured.push(frame.retagged(FrameKind::Transparent));
            if frame.kind == FrameKind::Barrier {
                break;
            }
        }
        captured.reverse();
        captured
    }

    /// Lexical search: innermost outward, stopping after the first barrier
    pub fn find_lexical(&self, name: &str) -> Option<SymbolRef> {
        for frame in self.frames.iter().rev() {
            if let Some(sym) = frame.local(name) {
                return Some(sym);
            }
            if frame.kind == FrameKind::Barrier {
                break;
            }
        }
        None
    }

    /// Dynamic search across every active frame, innermost first
    pub fn find_dynamic(&self, name: &str) -> Option<SymbolRef> {
        self.frames.iter().rev().find_map(|frame| frame.dynamic(name))
    }

    /// Resolves the symbol carrying a `kind` binding for `name`.
    ///
    /// Frame bindings only ever hold variables, so function and constant
    /// lookups go straight to the global table.
    pub fn find_symbol(
        &self,
        name: &str,
        kind: BindingKind,
        globals: &SymbolTable,
    ) -> Option<SymbolRef> {
        if kind == BindingKind::Variable {
            if let Some(sym) = self.find_lexical(name).or_else(|| self.find_dynamic(name)) {
                return Some(sym);
            }
        }
        globals.lookup(name).filter(|sym| sym.is_bound(kind))
    }
}
