//! Arithmetic and numeric comparison primitives

use crate::error::{Error, Result};
use crate::primitives::{require_at_least, Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::Value;

/// Register all numeric primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    // Arithmetic
    registry.register(AddPrimitive);
    registry.register(SubtractPrimitive);
    registry.register(MultiplyPrimitive);
    registry.register(DividePrimitive);
    registry.register(RemainderPrimitive);
    registry.register(OnePlusPrimitive);
    registry.register(OneMinusPrimitive);
    registry.register(AbsPrimitive);
    registry.register(MaxPrimitive);
    registry.register(MinPrimitive);

    // Numeric comparisons (variadic)
    registry.register(NumEqualPrimitive);
    registry.register(NumNotEqualPrimitive);
    registry.register(NumLessPrimitive);
    registry.register(NumGreaterPrimitive);
    registry.register(NumLessEqualPrimitive);
    registry.register(NumGreaterEqualPrimitive);
}

fn numbers(args: &[Value]) -> Result<Vec<f64>> {
    args.iter().map(Value::as_number).collect()
}

// ============================================================================
// Arithmetic
// ============================================================================

/// + - Sum of all arguments; `(+)` is 0
pub struct AddPrimitive;

impl Primitive for AddPrimitive {
    fn name(&self) -> &str {
        "+"
    }

    fn description(&self) -> &str {
        "Add numbers"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(numbers(args)?.iter().sum()))
    }
}

/// - - Subtraction; `(- x)` negates, `(-)` is 0
pub struct SubtractPrimitive;

impl Primitive for SubtractPrimitive {
    fn name(&self) -> &str {
        "-"
    }

    fn description(&self) -> &str {
        "Subtract numbers, or negate a single number"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let nums = numbers(args)?;
        let result = match nums.split_first() {
            None => 0.0,
            Some((only, [])) => -only,
            Some((first, rest)) => rest.iter().fold(*first, |acc, n| acc - n),
        };
        Ok(Value::Number(result))
    }
}

/// * - Product of all arguments; `(*)` is 1
pub struct MultiplyPrimitive;

impl Primitive for MultiplyPrimitive {
    fn name(&self) -> &str {
        "*"
    }

    fn description(&self) -> &str {
        "Multiply numbers"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(numbers(args)?.iter().product()))
    }
}

/// / - Division from left to right; `(/ x)` is x
pub struct DividePrimitive;

impl Primitive for DividePrimitive {
    fn name(&self) -> &str {
        "/"
    }

    fn description(&self) -> &str {
        "Divide the first number by the rest"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        require_at_least("/", 1, args)?;
        let nums = numbers(args)?;
        let mut result = nums[0];
        for divisor in &nums[1..] {
            if *divisor == 0.0 {
                return Err(Error::DivisionByZero);
            }
            result /= divisor;
        }
        Ok(Value::Number(result))
    }
}

/// % - Remainder with the sign of the dividend
pub struct RemainderPrimitive;

impl Primitive for RemainderPrimitive {
    fn name(&self) -> &str {
        "%"
    }

    fn description(&self) -> &str {
        "Remainder of dividing two numbers"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let dividend = args[0].as_number()?;
        let divisor = args[1].as_number()?;
        if divisor == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(Value::Number(dividend % divisor))
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

/// 1+ - Increment
pub struct OnePlusPrimitive;

impl Primitive for OnePlusPrimitive {
    fn name(&self) -> &str {
        "1+"
    }

    fn description(&self) -> &str {
        "Add one to a number"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(args[0].as_number()? + 1.0))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// 1- - Decrement
pub struct OneMinusPrimitive;

impl Primitive for OneMinusPrimitive {
    fn name(&self) -> &str {
        "1-"
    }

    fn description(&self) -> &str {
        "Subtract one from a number"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(args[0].as_number()? - 1.0))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// ABS - Absolute value
pub struct AbsPrimitive;

impl Primitive for AbsPrimitive {
    fn name(&self) -> &str {
        "abs"
    }

    fn description(&self) -> &str {
        "Absolute value"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(args[0].as_number()?.abs()))
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }
}

/// MAX - Largest argument
pub struct MaxPrimitive;

impl Primitive for MaxPrimitive {
    fn name(&self) -> &str {
        "max"
    }

    fn description(&self) -> &str {
        "Largest of the given numbers"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        require_at_least("max", 1, args)?;
        let nums = numbers(args)?;
        Ok(Value::Number(nums.into_iter().fold(f64::NEG_INFINITY, f64::max)))
    }
}

/// MIN - Smallest argument
pub struct MinPrimitive;

impl Primitive for MinPrimitive {
    fn name(&self) -> &str {
        "min"
    }

    fn description(&self) -> &str {
        "Smallest of the given numbers"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        require_at_least("min", 1, args)?;
        let nums = numbers(args)?;
        Ok(Value::Number(nums.into_iter().fold(f64::INFINITY, f64::min)))
    }
}

// ============================================================================
// Numeric Comparisons
// ============================================================================

macro_rules! chained_comparison {
    ($name:ident, $str:expr, $desc:expr, $op:tt) => {
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
                require_at_least($str, 1, args)?;
                let nums = numbers(args)?;
                Ok(Value::bool(nums.windows(2).all(|w| w[0] $op w[1])))
            }
        }
    };
}

chained_comparison!(NumEqualPrimitive, "=", "Check if all numbers are equal", ==);
chained_comparison!(NumLessPrimitive, "<", "Check if numbers are strictly increasing", <);
chained_comparison!(NumGreaterPrimitive, ">", "Check if numbers are strictly decreasing", >);
chained_comparison!(NumLessEqualPrimitive, "<=", "Check if numbers are non-decreasing", <=);
chained_comparison!(NumGreaterEqualPrimitive, ">=", "Check if numbers are non-increasing", >=);

/// /= - Numeric inequality (all different)
pub struct NumNotEqualPrimitive;

impl Primitive for NumNotEqualPrimitive {
    fn name(&self) -> &str {
        "/="
    }

    fn description(&self) -> &str {
        "Check if all numbers are different"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        require_at_least("/=", 1, args)?;
        let nums = numbers(args)?;
        for i in 0..nums.len() {
            for j in (i + 1)..nums.len() {
                if nums[i] == nums[j] {
                    return Ok(Value::nil());
                }
            }
        }
        Ok(Value::t())
    }
}
