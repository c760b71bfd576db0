//! Pair and list primitives

use crate::error::{Error, Result};
use crate::primitives::{Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::printer::render;
use crate::runtime::Value;

/// Register all list primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    // Accessors
    registry.register(CarPrimitive);
    registry.register(CdrPrimitive);
    registry.register(CadrPrimitive);
    registry.register(CddrPrimitive);
    registry.register(NthPrimitive);
    registry.register(NthcdrPrimitive);
    registry.register(LastPrimitive);
    registry.register(LengthPrimitive);

    // Constructors
    registry.register(ConsPrimitive);
    registry.register(ListPrimitive);
    registry.register(AppendPrimitive);
    registry.register(ReversePrimitive);

    // Mutators
    registry.register(SetcarPrimitive);
    registry.register(SetcdrPrimitive);
}

fn index_arg(value: &Value) -> Result<usize> {
    let n = value.as_number()?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(Error::type_error("non-negative integer", render(value)));
    }
    Ok(n as usize)
}

/// Fails once the fast cursor of a tail walk lands on the slow one
fn check_cycle(slow: &Value, fast: &Value) -> Result<()> {
    if let (Value::Pair(a), Value::Pair(b)) = (slow, fast) {
        if a.ptr_eq(b) {
            return Err(Error::type_error("proper list", "circular list"));
        }
    }
    Ok(())
}

fn nthcdr(n: usize, list: &Value) -> Result<Value> {
    let mut current = list.clone();
    let mut slow = list.clone();
    for step in 0..n {
        if current.is_nil() {
            break;
        }
        current = current.cdr()?;
        if step % 2 == 1 {
            slow = slow.cdr()?;
        }
        check_cycle(&slow, &current)?;
    }
    Ok(current)
}

macro_rules! accessor_primitive {
    ($name:ident, $str:expr, $desc:expr, |$arg:ident| $body:expr) => {
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
                $body
            }

            fn arity(&self) -> Option<usize> {
                Some(1)
            }
        }
    };
}

accessor_primitive!(CarPrimitive, "car", "Head of a pair (nil for nil)", |list| list.car());
accessor_primitive!(CdrPrimitive, "cdr", "Tail of a pair (nil for nil)", |list| list.cdr());
accessor_primitive!(CadrPrimitive, "cadr", "Second element of a list", |list| list
    .cdr()?
    .car());
accessor_primitive!(CddrPrimitive, "cddr", "List without its first two elements", |list| list
    .cdr()?
    .cdr());
accessor_primitive!(LengthPrimitive, "length", "Number of elements in a proper list", |list| {
    Ok(Value::Number(list.to_vec()?.len() as f64))
});
accessor_primitive!(ReversePrimitive, "reverse", "Fresh list with the elements reversed", |list| {
    let mut items = list.to_vec()?;
    items.reverse();
    Ok(Value::list(items))
});
accessor_primitive!(LastPrimitive, "last", "Last pair of a list", |list| {
    let mut current = list.clone();
    let mut slow = list.clone();
    let mut step = 0usize;
    while let Value::Pair(pair) = &current {
        match pair.tail() {
            next @ Value::Pair(_) => current = next,
            _ => break,
        }
        if step % 2 == 1 {
            slow = slow.cdr()?;
        }
        step += 1;
        check_cycle(&slow, &current)?;
    }
    if current.is_list() {
        Ok(current)
    } else {
        Err(Error::type_error("list", render(list)))
    }
});

/// NTH - Element at a zero-based index (nil past the end)
pub struct NthPrimitive;

impl Primitive for NthPrimitive {
    fn name(&self) -> &str {
        "nth"
    }

    fn description(&self) -> &str {
        "Element of a list at the given index"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        nthcdr(index_arg(&args[0])?, &args[1])?.car()
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// NTHCDR - List with the first n elements dropped
pub struct NthcdrPrimitive;

impl Primitive for NthcdrPrimitive {
    fn name(&self) -> &str {
        "nthcdr"
    }

    fn description(&self) -> &str {
        "Drop the first n elements of a list"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        nthcdr(index_arg(&args[0])?, &args[1])
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// CONS - Allocate a pair
pub struct ConsPrimitive;

impl Primitive for ConsPrimitive {
    fn name(&self) -> &str {
        "cons"
    }

    fn description(&self) -> &str {
        "Construct a pair"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::cons(args[0].clone(), args[1].clone()))
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// LIST - Fresh proper list of the arguments
pub struct ListPrimitive;

impl Primitive for ListPrimitive {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "Construct a list from the arguments"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::list(args.iter().cloned()))
    }
}

/// APPEND - Concatenate lists; the last argument is shared, not copied
pub struct AppendPrimitive;

impl Primitive for AppendPrimitive {
    fn name(&self) -> &str {
        "append"
    }

    fn description(&self) -> &str {
        "Concatenate lists"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let Some((last, init)) = args.split_last() else {
            return Ok(Value::nil());
        };
        let mut items = Vec::new();
        for list in init {
            items.extend(list.to_vec()?);
        }
        Ok(Value::list_with_tail(items, last.clone()))
    }
}

/// SETCAR - Replace the head of a pair in place
pub struct SetcarPrimitive;

impl Primitive for SetcarPrimitive {
    fn name(&self) -> &str {
        "setcar"
    }

    fn description(&self) -> &str {
        "Set the head of a pair"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let pair = args[0]
            .as_pair()
            .ok_or_else(|| Error::type_error("cons", render(&args[0])))?;
        pair.set_head(args[1].clone());
        Ok(args[1].clone())
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// SETCDR - Replace the tail of a pair in place
pub struct SetcdrPrimitive;

impl Primitive for SetcdrPrimitive {
    fn name(&self) -> &str {
        "setcdr"
    }

    fn description(&self) -> &str {
        "Set the tail of a pair"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let pair = args[0]
            .as_pair()
            .ok_or_else(|| Error::type_error("cons", render(&args[0])))?;
        pair.set_tail(args[1].clone());
        Ok(args[1].clone())
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}
