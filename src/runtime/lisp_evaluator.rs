use std::io::{self, Write};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::lexer::{SExprScanner, Token};
use crate::parser::SExprParser;
use crate::primitives::{PrimitiveContext, PrimitiveRegistry};
use crate::runtime::binder::{bind_arguments, split_declarations, ParamList};
use crate::runtime::environment::{CallStack, Frame, FrameKind};
use crate::runtime::macros::{self, MacroTable};
use crate::runtime::printer::render;
use crate::runtime::symbol::{BindingKind, SymbolRef, SymbolTable};
use crate::runtime::value::Closure;
use crate::runtime::{builtins, prelude, special_forms, stack, Value};

/// Default maximum evaluation depth
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Environment variable overriding the maximum evaluation depth
pub const MAX_DEPTH_ENV: &str = "MISPLI_MAX_DEPTH";

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Nesting depth of `eval` beyond which StackExhausted is raised
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvaluatorConfig {
    /// Reads `MISPLI_MAX_DEPTH`, falling back to the default
    pub fn from_env() -> Self {
        let max_depth = std::env::var(MAX_DEPTH_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);
        EvaluatorConfig { max_depth }
    }
}

/// LISP evaluator owning one evaluation session
///
/// The session holds:
/// - the global symbol table (variable, function and constant bindings)
/// - the frame stack used for lexical and dynamic lookup
/// - the macro table, disjoint from function bindings
/// - the primitive registry consulted for builtin calls
///
/// Evaluation of a pair whose head is a symbol tries, in order: special
/// forms, macros, evaluator builtins, primitives, and finally the symbol's
/// global function binding.
pub struct LispEvaluator {
    pub(crate) symbols: SymbolTable,
    pub(crate) stack: CallStack,
    pub(crate) macros: MacroTable,
    registry: Arc<PrimitiveRegistry>,
    config: EvaluatorConfig,
    depth: usize,
    output: Box<dyn Write>,
}

impl LispEvaluator {
    /// Creates a new evaluator configured from the environment
    pub fn new() -> Self {
        Self::build(EvaluatorConfig::from_env(), PrimitiveRegistry::new())
    }

    /// Creates a new evaluator with an explicit configuration
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self::build(config, PrimitiveRegistry::new())
    }

    /// Creates a new evaluator with custom primitive registry
    pub fn with_registry(registry: PrimitiveRegistry) -> Self {
        Self::build(EvaluatorConfig::from_env(), registry)
    }

    fn build(config: EvaluatorConfig, registry: PrimitiveRegistry) -> Self {
        let mut eval = LispEvaluator {
            symbols: SymbolTable::new(),
            stack: CallStack::new(),
            macros: MacroTable::new(),
            registry: Arc::new(registry),
            config,
            depth: 0,
            output: Box::new(io::stdout()),
        };
        if let Err(err) = prelude::load(&mut eval) {
            warn!(error = %err, "failed to load prelude");
        }
        eval
    }

    /// Redirects output of printing primitives
    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.output = output;
    }

    /// Active configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Global symbol table
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Macro table
    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Number of frames currently on the call stack
    pub fn stack_height(&self) -> usize {
        self.stack.len()
    }

    /// Interns `name` in this session's table
    pub fn intern(&mut self, name: &str) -> Value {
        Value::Symbol(self.symbols.intern(name))
    }

    /// Reads every form in `source`, interning symbols into this session
    pub fn read(&mut self, source: &str) -> Result<Vec<Value>> {
        let tokens = SExprScanner::new(source).scan_tokens()?;
        self.read_tokens(tokens)
    }

    /// Parses already scanned tokens, interning symbols into this session
    pub fn read_tokens(&mut self, tokens: Vec<Token>) -> Result<Vec<Value>> {
        SExprParser::new(tokens, &mut self.symbols).parse()
    }

    /// Reads and evaluates `source`, returning the last value
    pub fn eval_str(&mut self, source: &str) -> Result<Value> {
        let forms = self.read(source)?;
        self.execute(&forms)
    }

    /// Evaluates top-level forms in order, returning the last value.
    ///
    /// Depth and stack are reset before each form, so an error in one
    /// input never leaks into the next.
    pub fn execute(&mut self, forms: &[Value]) -> Result<Value> {
        let mut last_val = Value::nil();

        for form in forms {
            self.depth = 0;
            self.stack.truncate(0);
            last_val = self.eval(form)?;
        }

        Ok(last_val)
    }

    /// Evaluates one form in the current stack.
    ///
    /// The native stack grows on demand, so nesting is bounded by the
    /// configured depth rather than by the host thread's stack size.
    pub fn eval(&mut self, form: &Value) -> Result<Value> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            self.depth -= 1;
            warn!(limit = self.config.max_depth, "evaluation depth exceeded");
            return Err(Error::StackExhausted {
                limit: self.config.max_depth,
            });
        }
        let result = stack::guarded(|| match form {
            Value::Symbol(sym) => self.eval_symbol(sym),
            Value::Pair(pair) => self.eval_call(&pair.head(), &pair.tail()),
            Value::String(_) | Value::Number(_) | Value::Closure(_) => Ok(form.clone()),
        });
        self.depth -= 1;
        result
    }

    /// Value of a symbol: keywords evaluate to themselves, constants win over variables
    fn eval_symbol(&mut self, sym: &SymbolRef) -> Result<Value> {
        if sym.is_keyword() {
            return Ok(Value::Symbol(sym.clone()));
        }
        self.symbol_value(sym.name())
            .ok_or_else(|| Error::UnboundVariable {
                name: sym.name().to_string(),
            })
    }

    /// Resolves the constant or variable value reachable under `name`
    pub(crate) fn symbol_value(&self, name: &str) -> Option<Value> {
        let constant = self
            .stack
            .find_symbol(name, BindingKind::Constant, &self.symbols)
            .and_then(|sym| sym.binding(BindingKind::Constant));
        constant.or_else(|| {
            self.stack
                .find_symbol(name, BindingKind::Variable, &self.symbols)
                .and_then(|sym| sym.binding(BindingKind::Variable))
        })
    }

    fn eval_call(&mut self, head: &Value, args_form: &Value) -> Result<Value> {
        match head {
            Value::Symbol(sym) => {
                let name = sym.name();
                if let Some(handler) = special_forms::lookup(name) {
                    return handler(self, args_form).map_err(|err| err.in_form(name));
                }
                if let Some(definition) = self.macros.get(name) {
                    let expansion = macros::expand_once(self, &definition, args_form)?;
                    return self.eval(&expansion);
                }
                let args = self.eval_args(args_form)?;
                self.call_named(name, args)
            }
            Value::Pair(pair) if pair.head().is_symbol_named("lambda") => {
                let closure = self.lambda_literal(&pair.tail())?;
                let args = self.eval_args(args_form)?;
                self.apply_closure(&closure, args, FrameKind::Transparent)
            }
            other => Err(Error::type_error("function", render(other))),
        }
    }

    /// Evaluates each element of an argument list, left to right
    pub(crate) fn eval_args(&mut self, args_form: &Value) -> Result<Vec<Value>> {
        let forms = args_form.to_vec()?;
        let mut args = Vec::with_capacity(forms.len());
        for form in &forms {
            args.push(self.eval(form)?);
        }
        Ok(args)
    }

    /// Calls the builtin, primitive or global function named `name`
    pub(crate) fn call_named(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        if builtins::is_builtin(name) {
            return builtins::call(self, name, args);
        }
        if self.registry.has(name) {
            let registry = self.registry.clone();
            let mut ctx = PrimitiveContext {
                output: &mut *self.output,
                symbols: &mut self.symbols,
            };
            return registry.call(name, &mut ctx, &args);
        }
        let function = self
            .symbols
            .lookup(name)
            .and_then(|sym| sym.binding(BindingKind::Function))
            .ok_or_else(|| Error::UndefinedFunction {
                name: name.to_string(),
            })?;
        self.apply_function(&function, args)
    }

    /// True when `name` can be called as a function
    pub(crate) fn is_callable(&self, name: &str) -> bool {
        builtins::is_builtin(name)
            || self.registry.has(name)
            || self
                .symbols
                .lookup(name)
                .map(|sym| sym.is_bound(BindingKind::Function))
                .unwrap_or(false)
    }

    /// Applies a function value: a closure, a symbol naming a function, or a
    /// literal `(lambda ...)` list
    pub fn apply_function(&mut self, function: &Value, args: Vec<Value>) -> Result<Value> {
        match function {
            Value::Closure(closure) => self.apply_closure(closure, args, FrameKind::Barrier),
            Value::Symbol(sym) => {
                let name = sym.name_rc();
                self.call_named(&name, args)
            }
            Value::Pair(pair) if pair.head().is_symbol_named("lambda") => {
                let closure = self.lambda_literal(&pair.tail())?;
                self.apply_closure(&closure, args, FrameKind::Transparent)
            }
            other => Err(Error::type_error("function", render(other))),
        }
    }

    /// Runs a closure body in a fresh activation.
    ///
    /// The activation is popped on every exit path, including errors.
    pub(crate) fn apply_closure(
        &mut self,
        closure: &Rc<Closure>,
        args: Vec<Value>,
        kind: FrameKind,
    ) -> Result<Value> {
        trace!(name = closure.display_name(), args = args.len(), "applying closure");
        let (frame, mut scope) = self.enter_scope(&closure.captured, kind);
        bind_arguments(
            &mut scope,
            &frame,
            closure.display_name(),
            &closure.params,
            &closure.specials,
            args,
        )?;
        scope.eval_body(&closure.body)
    }

    /// Pushes an activation and returns its innermost frame plus a guard
    /// that restores the stack height when dropped
    pub(crate) fn enter_scope(
        &mut self,
        captured: &[Frame],
        kind: FrameKind,
    ) -> (Frame, ScopeGuard<'_>) {
        let height = self.stack.len();
        let frame = self.stack.push_activation(captured, kind);
        (frame, ScopeGuard { eval: self, height })
    }

    /// Evaluates forms in sequence, returning the last value (nil if none)
    pub(crate) fn eval_body(&mut self, body: &[Value]) -> Result<Value> {
        let mut last_val = Value::nil();
        for form in body {
            last_val = self.eval(form)?;
        }
        Ok(last_val)
    }

    /// Builds a closure from `(params body...)`.
    ///
    /// A leading docstring (when more forms follow) and a leading
    /// `(declare (special ...))` are removed from the body.
    pub(crate) fn make_closure(
        &mut self,
        name: Option<Rc<str>>,
        spec: &[Value],
        capture: bool,
    ) -> Result<Closure> {
        let (params_form, body) = spec
            .split_first()
            .ok_or_else(|| Error::malformed("missing parameter list"))?;
        let params = ParamList::parse(params_form)?;
        let body = match body {
            [Value::String(_), rest @ ..] if !rest.is_empty() => rest,
            _ => body,
        };
        let (specials, body) = split_declarations(body)?;
        let captured = if capture {
            self.stack.capture()
        } else {
            Vec::new()
        };
        Ok(Closure {
            name,
            params,
            body: body.to_vec(),
            specials,
            captured,
        })
    }

    fn lambda_literal(&mut self, spec: &Value) -> Result<Rc<Closure>> {
        let spec = spec.to_vec()?;
        self.make_closure(None, &spec, false)
            .map(Rc::new)
            .map_err(|err| err.in_form("lambda"))
    }
}

impl Default for LispEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the call stack to its height at creation when dropped
pub(crate) struct ScopeGuard<'a> {
    eval: &'a mut LispEvaluator,
    height: usize,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.eval.stack.truncate(self.height);
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = LispEvaluator;

    fn deref(&self) -> &Self::Target {
        self.eval
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.eval
    }
}
