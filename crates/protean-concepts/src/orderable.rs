//! Orderable: strict weak ordering
//!
//! Minimal complete definition: `less`. Everything else is expressed
//! through it: `less_equal(x, y) == !less(y, x)`, `greater` flips,
//! `min`/`max` keep the first argument on ties. Orderable refines
//! Comparable by convention (its laws mention equality); the engine only
//! records the edge.

use crate::support::{is_ordered_scalar, lift_bool, truth};
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, DispatchError, RegistryBuilder,
    Value,
};

/// Name of the Orderable concept
pub const ORDERABLE: &str = "Orderable";

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.algorithm("less", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("less_equal", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("greater", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("greater_equal", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("min", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("max", Dispatch::Binary, Arity::Exact(2))?;

    builder.concept(
        ConceptDef::new(ORDERABLE)
            .refines(crate::comparable::COMPARABLE)
            .strategy("less", &["less"]),
    )?;

    // Model for ordered scalar tags
    builder.implement_when(
        "less",
        "orderable::scalar",
        |_, tag| is_ordered_scalar(tag),
        |_, _, args| {
            let out = match (&args[0], &args[1]) {
                (Value::I32(a), Value::I32(b)) => a < b,
                (Value::I64(a), Value::I64(b)) => a < b,
                (Value::F64(a), Value::F64(b)) => a < b,
                (Value::Str(a), Value::Str(b)) => a < b,
                (x, y) => {
                    return Err(DispatchError::Payload {
                        algorithm: "less".to_string(),
                        expected: "two scalars of one tag".to_string(),
                        found: format!("{}, {}", x.tag(), y.tag()),
                    })
                }
            };
            Ok(Value::Bool(out))
        },
    )?;

    // Model for constants over an orderable payload
    builder.implement_when(
        "less",
        "orderable::constant",
        |registry, tag| {
            tag.is_constant()
                && tag
                    .underlying()
                    .is_some_and(|u| registry.models(ORDERABLE, u).unwrap_or(false))
        },
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let y = registry.value(&args[1])?;
            let lt = registry.call("less", &[x, y])?;
            Ok(lift_bool(tag, truth(&lt, "less")?))
        },
    )?;

    builder.default_impl("less_equal", "orderable::less_equal", |registry, tag, args| {
        let gt = registry.call("less", &[args[1].clone(), args[0].clone()])?;
        Ok(lift_bool(tag, !truth(&gt, "less_equal")?))
    })?;

    builder.default_impl("greater", "orderable::greater", |registry, tag, args| {
        let gt = registry.call("less", &[args[1].clone(), args[0].clone()])?;
        Ok(lift_bool(tag, truth(&gt, "greater")?))
    })?;

    builder.default_impl(
        "greater_equal",
        "orderable::greater_equal",
        |registry, tag, args| {
            let lt = registry.call("less", &[args[0].clone(), args[1].clone()])?;
            Ok(lift_bool(tag, !truth(&lt, "greater_equal")?))
        },
    )?;

    // min and max keep the first argument among equals
    builder.default_impl("min", "orderable::min", |registry, _, args| {
        let second_smaller =
            registry.call("less", &[args[1].clone(), args[0].clone()])?;
        if truth(&second_smaller, "min")? {
            Ok(args[1].clone())
        } else {
            Ok(args[0].clone())
        }
    })?;

    builder.default_impl("max", "orderable::max", |registry, _, args| {
        let first_smaller =
            registry.call("less", &[args[0].clone(), args[1].clone()])?;
        if truth(&first_smaller, "max")? {
            Ok(args[1].clone())
        } else {
            Ok(args[0].clone())
        }
    })?;

    Ok(())
}
