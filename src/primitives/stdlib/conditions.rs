//! Error signalling

use crate::error::{Error, Result};
use crate::primitives::{Primitive, PrimitiveContext, PrimitiveRegistry};
use crate::runtime::printer::render_plain;
use crate::runtime::Value;

/// Register condition primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(ErrorPrimitive);
}

/// ERROR - Signal a user error whose message joins the plain renderings of the arguments
pub struct ErrorPrimitive;

impl Primitive for ErrorPrimitive {
    fn name(&self) -> &str {
        "error"
    }

    fn description(&self) -> &str {
        "Signal an error condition"
    }

    fn execute(&self, _ctx: &mut PrimitiveContext<'_>, args: &[Value]) -> Result<Value> {
        let message: String = args.iter().map(render_plain).collect();
        Err(Error::UserError(message))
    }
}
