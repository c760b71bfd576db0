//! Type and equality predicates
//!
//! Every predicate returns `t` or `nil`.

use crate::error::Result;
use crate::primitives::{Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::Value;

/// Register all predicate primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    // Type predicates
    registry.register(NullPrimitive);
    registry.register(NotPrimitive);
    registry.register(AtomPrimitive);
    registry.register(ConspPrimitive);
    registry.register(ListpPrimitive);
    registry.register(SymbolpPrimitive);
    registry.register(StringpPrimitive);
    registry.register(NumberpPrimitive);
    registry.register(FunctionpPrimitive);
    registry.register(KeywordpPrimitive);
    registry.register(ZeropPrimitive);

    // Equality
    registry.register(EqPrimitive);
    registry.register(EqlPrimitive);
    registry.register(EqualPrimitive);
}

macro_rules! unary_predicate {
    ($name:ident, $str:expr, $desc:expr, |$arg:ident| $test:expr) => {
        #[doc = $desc]
        pub struct $name;

        impl Primitive for $name {
            fn name(&self) -> &str {
                $str
            }

            fn description(&self) -> &str {
                $desc
            }

            fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
                let $arg = &args[0];
                Ok(Value::bool($test))
            }

            fn arity(&self) -> Option<usize> {
                Some(1)
            }
        }
    };
}

macro_rules! binary_predicate {
    ($name:ident, $str:expr, $desc:expr, |$a:ident, $b:ident| $test:expr) => {
        #[doc = $desc]
        pub struct $name;

        impl Primitive for $name {
            fn name(&self) -> &str {
                $str
            }

            fn description(&self) -> &str {
                $desc
            }

            fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
                let ($a, $b) = (&args[0], &args[1]);
                Ok(Value::bool($test))
            }

            fn arity(&self) -> Option<usize> {
                Some(2)
            }
        }
    };
}

unary_predicate!(NullPrimitive, "null", "True for nil", |v| v.is_nil());
unary_predicate!(NotPrimitive, "not", "Logical negation", |v| v.is_nil());
unary_predicate!(AtomPrimitive, "atom", "True for anything but a pair", |v| v
    .is_atom());
unary_predicate!(ConspPrimitive, "consp", "True for a pair", |v| !v.is_atom());
unary_predicate!(ListpPrimitive, "listp", "True for nil or a pair", |v| v
    .is_list());
unary_predicate!(SymbolpPrimitive, "symbolp", "True for a symbol", |v| matches!(
    v,
    Value::Symbol(_)
));
unary_predicate!(StringpPrimitive, "stringp", "True for a string", |v| matches!(
    v,
    Value::String(_)
));
unary_predicate!(NumberpPrimitive, "numberp", "True for a number", |v| matches!(
    v,
    Value::Number(_)
));
unary_predicate!(FunctionpPrimitive, "functionp", "True for a closure", |v| matches!(
    v,
    Value::Closure(_)
));
unary_predicate!(KeywordpPrimitive, "keywordp", "True for a :keyword symbol", |v| v
    .as_symbol()
    .map(|s| s.is_keyword())
    .unwrap_or(false));
unary_predicate!(ZeropPrimitive, "zerop", "True for the number zero", |v| v
    .as_number()?
    == 0.0);

binary_predicate!(EqPrimitive, "eq", "Identity comparison", |a, b| a.is_eq(b));
binary_predicate!(
    EqlPrimitive,
    "eql",
    "Identity comparison, also equal for same-valued numbers",
    |a, b| a.is_eq(b)
);
binary_predicate!(EqualPrimitive, "equal", "Structural equality", |a, b| a == b);
