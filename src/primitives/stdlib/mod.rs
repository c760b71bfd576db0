//! Standard primitive library for mispli

pub mod conditions;
pub mod io_basic;
pub mod lists;
pub mod numeric;
pub mod predicates;
pub mod strings;

use crate::primitives::PrimitiveRegistry;

/// Register all standard library primitives
pub fn register_all(registry: &mut PrimitiveRegistry) {
    numeric::register(registry);
    lists::register(registry);
    predicates::register(registry);
    strings::register(registry);
    io_basic::register(registry);
    conditions::register(registry);
}
