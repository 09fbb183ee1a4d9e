//! Comparable: equality
//!
//! Minimal complete definition: `equal`. `not_equal` is the generic
//! negation. Plain scalar tags compare natively; two constants of the same
//! tag compare by their payloads and yield a constant truth value.
//! Cross-tag equality goes through the engine's common-type path; a pair
//! with no common embedding is a resolution failure, not `false`.

use crate::support::{is_scalar, lift_bool, truth};
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, RegistryBuilder, Value,
};

/// Name of the Comparable concept
pub const COMPARABLE: &str = "Comparable";

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.algorithm("equal", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("not_equal", Dispatch::Binary, Arity::Exact(2))?;

    builder.concept(ConceptDef::new(COMPARABLE).strategy("equal", &["equal"]))?;

    // Model for plain scalar tags: structural comparison
    builder.implement_when(
        "equal",
        "comparable::scalar",
        |_, tag| is_scalar(tag),
        |_, _, args| Ok(Value::Bool(args[0] == args[1])),
    )?;

    // Model for constants over a comparable payload: compare the payloads,
    // keep the result a constant
    builder.implement_when(
        "equal",
        "comparable::constant",
        |registry, tag| {
            tag.is_constant()
                && tag
                    .underlying()
                    .is_some_and(|u| registry.models(COMPARABLE, u).unwrap_or(false))
        },
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let y = registry.value(&args[1])?;
            let eq = registry.call("equal", &[x, y])?;
            Ok(lift_bool(tag, truth(&eq, "equal")?))
        },
    )?;

    // not_equal is the negation of whatever equal resolves to
    builder.default_impl("not_equal", "comparable::not_equal", |registry, tag, args| {
        let eq = registry.call("equal", args)?;
        Ok(lift_bool(tag, !truth(&eq, "not_equal")?))
    })?;

    Ok(())
}
