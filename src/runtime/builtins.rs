//! Builtins that re-enter the evaluator
//!
//! Unlike primitives these need the evaluator itself: they apply
//! function values or inspect bindings through the active stack.

use crate::error::{Error, Result};
use crate::runtime::special_forms;
use crate::runtime::symbol::BindingKind;
use crate::runtime::{LispEvaluator, Value};

/// Names handled by [`call`]
pub const BUILTIN_NAMES: &[&str] = &[
    "funcall",
    "apply",
    "eval",
    "mapcar",
    "boundp",
    "fboundp",
    "symbol-value",
    "symbol-function",
];

/// True when `name` is an evaluator builtin
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

fn arity(name: &str, args: &[Value], min: usize, max: Option<usize>) -> Result<()> {
    let too_many = max.map(|max| args.len() > max).unwrap_or(false);
    if args.len() < min || too_many {
        let expected = match max {
            Some(max) if max == min => format!("exactly {}", min),
            Some(max) => format!("between {} and {}", min, max),
            None => format!("at least {}", min),
        };
        return Err(Error::ArityError {
            name: name.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Runs the builtin `name` on evaluated arguments
pub fn call(eval: &mut LispEvaluator, name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "funcall" => {
            arity(name, &args, 1, None)?;
            let mut args = args.into_iter();
            let function = args.next().unwrap_or_else(Value::nil);
            eval.apply_function(&function, args.collect())
        }
        "apply" => {
            arity(name, &args, 2, None)?;
            let mut args = args;
            let spread = args.pop().unwrap_or_else(Value::nil).to_vec()?;
            let function = args.remove(0);
            args.extend(spread);
            eval.apply_function(&function, args)
        }
        "eval" => {
            arity(name, &args, 1, Some(1))?;
            eval.eval(&args[0])
        }
        "mapcar" => {
            arity(name, &args, 2, Some(2))?;
            let mut results = Vec::new();
            for item in args[1].to_vec()? {
                results.push(eval.apply_function(&args[0], vec![item])?);
            }
            Ok(Value::list(results))
        }
        "boundp" => {
            arity(name, &args, 1, Some(1))?;
            let sym = args[0].expect_symbol("symbol")?;
            Ok(Value::bool(
                sym.is_keyword() || eval.symbol_value(sym.name()).is_some(),
            ))
        }
        "fboundp" => {
            arity(name, &args, 1, Some(1))?;
            let name = args[0].expect_symbol("symbol")?.name();
            Ok(Value::bool(
                eval.is_callable(name)
                    || eval.macros.contains(name)
                    || special_forms::is_special_form(name),
            ))
        }
        "symbol-value" => {
            arity(name, &args, 1, Some(1))?;
            let sym = args[0].expect_symbol("symbol")?;
            if sym.is_keyword() {
                return Ok(args[0].clone());
            }
            eval.symbol_value(sym.name())
                .ok_or_else(|| Error::UnboundVariable {
                    name: sym.name().to_string(),
                })
        }
        "symbol-function" => {
            arity(name, &args, 1, Some(1))?;
            let sym = args[0].expect_symbol("symbol")?;
            if let Some(function) = sym.binding(BindingKind::Function) {
                return Ok(function);
            }
            // Builtins and primitives are named by their symbol
            if eval.is_callable(sym.name()) {
                return Ok(args[0].clone());
            }
            Ok(Value::nil())
        }
        _ => Err(Error::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}
