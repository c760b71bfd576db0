//! Basic output primitives
//!
//! All output goes to the session's sink (`PrimitiveContext::output`),
//! never directly to stdout.

use crate::error::Result;
use crate::primitives::{Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::printer::{render, render_plain};
use crate::runtime::Value;

/// Register all output primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(PrintPrimitive);
    registry.register(PrincPrimitive);
    registry.register(TerpriPrimitive);
}

/// PRINT - Readable representation followed by a newline
pub struct PrintPrimitive;

impl Primitive for PrintPrimitive {
    fn name(&self) -> &str {
        "print"
    }

    fn description(&self) -> &str {
        "Print readable representation with newline"
    }

    fn execute(&self, ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        writeln!(ctx.output, "{}", render(&args[0]))?;
        Ok(args[0].clone())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// PRINC - Plain representation, strings without quotes
pub struct PrincPrimitive;

impl Primitive for PrincPrimitive {
    fn name(&self) -> &str {
        "princ"
    }

    fn description(&self) -> &str {
        "Print value without escape characters"
    }

    fn execute(&self, ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        write!(ctx.output, "{}", render_plain(&args[0]))?;
        Ok(args[0].clone())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// TERPRI - Output a newline
pub struct TerpriPrimitive;

impl Primitive for TerpriPrimitive {
    fn name(&self) -> &str {
        "terpri"
    }

    fn description(&self) -> &str {
        "Output a newline"
    }

    fn execute(&self, ctx: &mut PrimitiveContext<'_>, _args: &[Value]) -> Result<Value> {
        writeln!(ctx.output)?;
        Ok(Value::nil())
    }

    fn arity(&self) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::SymbolTable;

    #[test]
    fn test_output_goes_to_sink() {
        let mut out = Vec::new();
        let mut symbols = SymbolTable::new();
        {
            let mut ctx = PrimitiveContext {
                output: &mut out,
                symbols: &mut symbols,
            };
            let s = Value::string("hi");
            assert_eq!(PrintPrimitive.execute(&mut ctx, &[s.clone()]).unwrap(), s);
            PrincPrimitive.execute(&mut ctx, &[s]).unwrap();
            TerpriPrimitive.execute(&mut ctx, &[]).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "\"hi\"\nhi\n");
    }
}
