//! String and symbol-name primitives

use crate::error::{Error, Result};
use crate::primitives::{Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::printer::{format_number, render};
use crate::runtime::Value;

/// Register all string primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(ConcatPrimitive);
    registry.register(StringLengthPrimitive);
    registry.register(StringEqualPrimitive);
    registry.register(NumberToStringPrimitive);
    registry.register(SymbolNamePrimitive);
    registry.register(InternPrimitive);
}

/// Text of a string or symbol argument
fn text_of(value: &Value) -> Result<&str> {
    match value {
        Value::String(s) => Ok(s),
        Value::Symbol(sym) => Ok(sym.name()),
        other => Err(Error::type_error("string or symbol", render(other))),
    }
}

/// CONCAT - Concatenate strings
pub struct ConcatPrimitive;

impl Primitive for ConcatPrimitive {
    fn name(&self) -> &str {
        "concat"
    }

    fn description(&self) -> &str {
        "Concatenate strings"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let mut result = String::new();
        for arg in args {
            result.push_str(arg.as_str()?);
        }
        Ok(Value::string(&result))
    }
}

/// STRING-LENGTH - Number of characters in a string
pub struct StringLengthPrimitive;

impl Primitive for StringLengthPrimitive {
    fn name(&self) -> &str {
        "string-length"
    }

    fn description(&self) -> &str {
        "Number of characters in a string"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(args[0].as_str()?.chars().count() as f64))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// STRING= - Compare the text of two strings or symbols
pub struct StringEqualPrimitive;

impl Primitive for StringEqualPrimitive {
    fn name(&self) -> &str {
        "string="
    }

    fn description(&self) -> &str {
        "Check whether two strings (or symbol names) are equal"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::bool(text_of(&args[0])? == text_of(&args[1])?))
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// NUMBER-TO-STRING - Printed representation of a number
pub struct NumberToStringPrimitive;

impl Primitive for NumberToStringPrimitive {
    fn name(&self) -> &str {
        "number-to-string"
    }

    fn description(&self) -> &str {
        "Convert a number to its printed representation"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::string(&format_number(args[0].as_number()?)))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// SYMBOL-NAME - Name of a symbol as a string
pub struct SymbolNamePrimitive;

impl Primitive for SymbolNamePrimitive {
    fn name(&self) -> &str {
        "symbol-name"
    }

    fn description(&self) -> &str {
        "Name of a symbol"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let sym = args[0].expect_symbol("symbol")?;
        Ok(Value::String(sym.name_rc()))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// INTERN - Symbol registered under a name in the global table
pub struct InternPrimitive;

impl Primitive for InternPrimitive {
    fn name(&self) -> &str {
        "intern"
    }

    fn description(&self) -> &str {
        "Find or create the global symbol with the given name"
    }

    fn execute(&self, ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let name = args[0].as_str()?;
        Ok(Value::Symbol(ctx.symbols.intern(name)))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}
