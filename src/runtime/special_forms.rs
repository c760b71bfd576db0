//! Special forms: control flow and binding constructs
//!
//! Each handler receives the unevaluated argument list. Handlers report
//! malformed arguments with [`Error::Malformed`]; the evaluator attaches the
//! form name before propagating.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use lazy_static::lazy_static;
use tracing::debug;

use crate::error::{Error, Result};
use crate::runtime::binder::split_declarations;
use crate::runtime::environment::FrameKind;
use crate::runtime::macros::macroexpand_1;
use crate::runtime::stack;
use crate::runtime::symbol::{BindingKind, SymbolRef};
use crate::runtime::{LispEvaluator, Value};

/// Handler signature shared by every special form
pub type SpecialForm = fn(&mut LispEvaluator, &Value) -> Result<Value>;

lazy_static! {
    static ref SPECIAL_FORMS: HashMap<&'static str, SpecialForm> = {
        let mut forms: HashMap<&'static str, SpecialForm> = HashMap::new();
        forms.insert("quote", eval_quote);
        forms.insert("function", eval_quote);
        forms.insert("set", eval_set);
        forms.insert("setq", eval_setq);
        forms.insert("defvar", eval_defvar);
        forms.insert("defconst", eval_defconst);
        forms.insert("defun", eval_defun);
        forms.insert("defmacro", eval_defmacro);
        forms.insert("let", eval_let);
        forms.insert("let*", eval_let_star);
        forms.insert("lambda", eval_lambda);
        forms.insert("if", eval_if);
        forms.insert("cond", eval_cond);
        forms.insert("while", eval_while);
        forms.insert("progn", eval_progn);
        forms.insert("prog1", eval_prog1);
        forms.insert("prog2", eval_prog2);
        forms.insert("and", eval_and);
        forms.insert("or", eval_or);
        forms.insert("macroexpand", eval_macroexpand);
        forms.insert("time", eval_time);
        forms.insert("backquote", eval_backquote);
        forms.insert("declare", eval_declare);
        forms
    };
}

/// Handler for the special form `name`, if there is one
pub fn lookup(name: &str) -> Option<SpecialForm> {
    SPECIAL_FORMS.get(name).copied()
}

/// True when `name` is a special form
pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains_key(name)
}

// ============================================================================
// Argument helpers
// ============================================================================

fn arguments(args: &Value) -> Result<Vec<Value>> {
    args.to_vec()
        .map_err(|_| Error::malformed("arguments must form a proper list"))
}

fn exactly(args: &Value, n: usize) -> Result<Vec<Value>> {
    let args = arguments(args)?;
    if args.len() != n {
        return Err(Error::malformed(format!(
            "expected {} argument{}, got {}",
            n,
            if n == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(args)
}

fn at_least(args: &Value, n: usize) -> Result<Vec<Value>> {
    let args = arguments(args)?;
    if args.len() < n {
        return Err(Error::malformed(format!(
            "expected at least {} argument{}, got {}",
            n,
            if n == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(args)
}

fn symbol_arg<'a>(value: &'a Value, what: &str) -> Result<&'a SymbolRef> {
    value
        .as_symbol()
        .ok_or_else(|| Error::malformed(format!("{} must be a symbol, got {}", what, value)))
}

// ============================================================================
// Quoting and assignment
// ============================================================================

fn eval_quote(_eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    Ok(exactly(args, 1)?.remove(0))
}

fn eval_set(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = exactly(args, 2)?;
    let target = eval.eval(&args[0])?;
    let value = eval.eval(&args[1])?;
    let sym = target.expect_symbol("symbol")?;
    assign(eval, sym, value.clone())?;
    Ok(value)
}

fn eval_setq(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = arguments(args)?;
    if args.len() % 2 != 0 {
        return Err(Error::malformed("odd number of arguments"));
    }
    let mut last_val = Value::nil();
    for pair in args.chunks(2) {
        let sym = symbol_arg(&pair[0], "variable name")?;
        let value = eval.eval(&pair[1])?;
        assign(eval, sym, value.clone())?;
        last_val = value;
    }
    Ok(last_val)
}

/// Rebinds the reachable variable binding of `sym`, or creates a global one
fn assign(eval: &mut LispEvaluator, sym: &SymbolRef, value: Value) -> Result<()> {
    let name = sym.name();
    let constant = eval
        .stack
        .find_symbol(name, BindingKind::Constant, &eval.symbols)
        .is_some();
    if constant || sym.is_keyword() {
        return Err(Error::ConstantAssignment {
            name: name.to_string(),
        });
    }
    match eval
        .stack
        .find_symbol(name, BindingKind::Variable, &eval.symbols)
    {
        Some(binding) => binding.set_variable(value),
        None => eval.symbols.intern(name).set_variable(value),
    }
}

// ============================================================================
// Definitions
// ============================================================================

fn eval_defvar(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    if args.len() > 3 {
        return Err(Error::malformed("expected (defvar name [value [doc]])"));
    }
    let name = symbol_arg(&args[0], "variable name")?.name_rc();
    let global = eval.symbols.intern(&name);
    if global.is_constant() {
        return Err(Error::ConstantAssignment {
            name: name.to_string(),
        });
    }
    if !global.is_bound(BindingKind::Variable) {
        if let Some(init) = args.get(1) {
            let value = eval.eval(init)?;
            global.set_variable(value)?;
        }
    }
    debug!(name = %name, "defvar");
    Ok(Value::Symbol(global))
}

fn eval_defconst(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 2)?;
    if args.len() > 3 {
        return Err(Error::malformed("expected (defconst name value [doc])"));
    }
    let name = symbol_arg(&args[0], "constant name")?.name_rc();
    let global = eval.symbols.intern(&name);
    if global.is_constant() {
        return Err(Error::ConstantAssignment {
            name: name.to_string(),
        });
    }
    let value = eval.eval(&args[1])?;
    global.set_constant(value)?;
    debug!(name = %name, "defconst");
    Ok(Value::Symbol(global))
}

fn eval_defun(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 2)?;
    let name = symbol_arg(&args[0], "function name")?.name_rc();
    let closure = eval.make_closure(Some(name.clone()), &args[1..], true)?;
    let global = eval.symbols.intern(&name);
    global.set_function(Value::Closure(Rc::new(closure)));
    debug!(name = %name, "defun");
    Ok(Value::Symbol(global))
}

fn eval_defmacro(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 2)?;
    let name = symbol_arg(&args[0], "macro name")?.name_rc();
    let closure = eval.make_closure(Some(name.clone()), &args[1..], true)?;
    eval.macros.define(name.clone(), Rc::new(closure));
    debug!(name = %name, "defmacro");
    Ok(eval.intern(&name))
}

fn eval_lambda(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    let closure = eval.make_closure(None, &args, true)?;
    Ok(Value::Closure(Rc::new(closure)))
}

// ============================================================================
// Local bindings
// ============================================================================

/// One `let` binding: `name`, `(name)` or `(name init)`
fn binding_spec(binding: &Value) -> Result<(Rc<str>, Option<Value>)> {
    let (name, init) = match binding {
        Value::Symbol(_) => (binding.clone(), None),
        Value::Pair(_) => {
            let parts = binding
                .to_vec()
                .map_err(|_| Error::malformed(format!("bad binding {}", binding)))?;
            if parts.len() > 2 {
                return Err(Error::malformed(format!("bad binding {}", binding)));
            }
            (parts[0].clone(), parts.get(1).cloned())
        }
        other => return Err(Error::malformed(format!("bad binding {}", other))),
    };
    let sym = symbol_arg(&name, "binding name")?;
    if sym.is_constant() {
        return Err(Error::ConstantAssignment {
            name: sym.name().to_string(),
        });
    }
    Ok((sym.name_rc(), init))
}

fn eval_let(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    let bindings = arguments(&args[0])?;

    // Initializers run in the enclosing frame
    let mut values = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let (name, init) = binding_spec(binding)?;
        let value = match init {
            Some(form) => eval.eval(&form)?,
            None => Value::nil(),
        };
        values.push((name, value));
    }

    let (specials, body) = split_declarations(&args[1..])?;
    let (frame, mut scope) = eval.enter_scope(&[], FrameKind::Transparent);
    for (name, value) in values {
        frame.bind(&name, value);
    }
    for name in &specials {
        frame.promote_special(name);
    }
    scope.eval_body(body)
}

fn eval_let_star(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    let bindings = arguments(&args[0])?;
    let (specials, body) = split_declarations(&args[1..])?;

    let (frame, mut scope) = eval.enter_scope(&[], FrameKind::Transparent);
    for binding in &bindings {
        let (name, init) = binding_spec(binding)?;
        let value = match init {
            Some(form) => scope.eval(&form)?,
            None => Value::nil(),
        };
        frame.bind(&name, value);
    }
    for name in &specials {
        frame.promote_special(name);
    }
    scope.eval_body(body)
}

// ============================================================================
// Control flow
// ============================================================================

fn eval_if(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 2)?;
    if eval.eval(&args[0])?.is_truthy() {
        eval.eval(&args[1])
    } else {
        eval.eval_body(&args[2..])
    }
}

fn eval_cond(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    for clause in arguments(args)? {
        let parts = clause
            .to_vec()
            .ok()
            .filter(|parts| !parts.is_empty())
            .ok_or_else(|| Error::malformed(format!("bad clause {}", clause)))?;
        let test = eval.eval(&parts[0])?;
        if test.is_truthy() {
            if parts.len() == 1 {
                return Ok(test);
            }
            return eval.eval_body(&parts[1..]);
        }
    }
    Ok(Value::nil())
}

fn eval_while(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    while eval.eval(&args[0])?.is_truthy() {
        eval.eval_body(&args[1..])?;
    }
    Ok(Value::nil())
}

fn eval_progn(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = arguments(args)?;
    eval.eval_body(&args)
}

fn eval_prog1(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 1)?;
    let first = eval.eval(&args[0])?;
    eval.eval_body(&args[1..])?;
    Ok(first)
}

fn eval_prog2(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = at_least(args, 2)?;
    eval.eval(&args[0])?;
    let second = eval.eval(&args[1])?;
    eval.eval_body(&args[2..])?;
    Ok(second)
}

fn eval_and(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let mut last_val = Value::t();
    for form in arguments(args)? {
        last_val = eval.eval(&form)?;
        if last_val.is_nil() {
            break;
        }
    }
    Ok(last_val)
}

fn eval_or(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    for form in arguments(args)? {
        let value = eval.eval(&form)?;
        if value.is_truthy() {
            return Ok(value);
        }
    }
    Ok(Value::nil())
}

// ============================================================================
// Macros, timing, templates
// ============================================================================

fn eval_macroexpand(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = exactly(args, 1)?;
    let form = eval.eval(&args[0])?;
    macroexpand_1(eval, &form)
}

fn eval_time(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = exactly(args, 1)?;
    let start = Instant::now();
    eval.eval(&args[0])?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(elapsed_ms, "time");
    Ok(Value::Number(elapsed_ms))
}

fn eval_declare(_eval: &mut LispEvaluator, _args: &Value) -> Result<Value> {
    Ok(Value::nil())
}

fn eval_backquote(eval: &mut LispEvaluator, args: &Value) -> Result<Value> {
    let args = exactly(args, 1)?;
    instantiate(eval, &args[0])
}

/// The single argument of `(marker x)` when `form` has that shape
fn marker_argument(form: &Value, marker: &str) -> Result<Option<Value>> {
    let Value::Pair(pair) = form else {
        return Ok(None);
    };
    if !pair.head().is_symbol_named(marker) {
        return Ok(None);
    }
    let rest = arguments(&pair.tail())?;
    if rest.len() != 1 {
        return Err(Error::malformed(format!("{} takes exactly 1 argument", marker)));
    }
    Ok(rest.into_iter().next())
}

/// Copies a backquote template, evaluating `unquote` and splicing `unquote-splicing`
fn instantiate(eval: &mut LispEvaluator, template: &Value) -> Result<Value> {
    if let Some(expr) = marker_argument(template, "unquote")? {
        return eval.eval(&expr);
    }
    if marker_argument(template, "unquote-splicing")?.is_some() {
        return Err(Error::malformed("unquote-splicing outside a list"));
    }
    if !matches!(template, Value::Pair(_)) {
        return Ok(template.clone());
    }

    let mut items = Vec::new();
    let mut current = template.clone();
    let tail = loop {
        match &current {
            Value::Pair(pair) => {
                // `(a . ,b)` reads as (a unquote b)
                if !items.is_empty() {
                    if let Some(expr) = marker_argument(&current, "unquote")? {
                        break eval.eval(&expr)?;
                    }
                }
                let item = pair.head();
                match marker_argument(&item, "unquote-splicing")? {
                    Some(expr) => items.extend(eval.eval(&expr)?.to_vec()?),
                    None => items.push(stack::guarded(|| instantiate(eval, &item))?),
                }
                let next = pair.tail();
                current = next;
            }
            other => break instantiate(eval, other)?,
        }
    };
    Ok(Value::list_with_tail(items, tail))
}
