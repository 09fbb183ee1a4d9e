//! Concept definitions and derivations
//!
//! Each module defines one concept (or a small family): its minimal
//! complete definition strategies, the derived operations installed against
//! the registry, and the guarded models every tag family gets for free
//! (plain scalars, constant wrappers). `install` wires the whole surface
//! into a builder; the constant bridge from `protean-core` must be
//! installed alongside it.

pub mod comparable;
pub mod foldable;
pub mod functor;
pub mod iterable;
pub mod numeric;
pub mod orderable;
pub mod searchable;
pub mod sequence;

use protean_core::{BuildError, RegistryBuilder};

/// Register every concept, algorithm, and derivation
pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    comparable::install(builder)?;
    orderable::install(builder)?;
    functor::install(builder)?;
    iterable::install(builder)?;
    foldable::install(builder)?;
    searchable::install(builder)?;
    sequence::install(builder)?;
    numeric::install(builder)?;
    tracing::debug!("concept surface installed");
    Ok(())
}

pub(crate) mod support {
    use protean_core::{DispatchError, Result, Tag, Value, CANONICAL_WRAPPER};

    /// Scalar tags adapted from plain types
    pub(crate) fn is_scalar(tag: &Tag) -> bool {
        matches!(
            tag,
            Tag::Foreign(name) if matches!(
                name.as_str(),
                "bool" | "i32" | "i64" | "f64" | "str" | "unit"
            )
        )
    }

    /// Scalars with a total order
    pub(crate) fn is_ordered_scalar(tag: &Tag) -> bool {
        matches!(
            tag,
            Tag::Foreign(name) if matches!(name.as_str(), "i32" | "i64" | "f64" | "str")
        )
    }

    /// Non-boolean arithmetic scalars
    pub(crate) fn is_numeric(tag: &Tag) -> bool {
        matches!(
            tag,
            Tag::Foreign(name) if matches!(name.as_str(), "i32" | "i64" | "f64")
        )
    }

    /// Integral scalars
    pub(crate) fn is_integral(tag: &Tag) -> bool {
        matches!(
            tag,
            Tag::Foreign(name) if matches!(name.as_str(), "i32" | "i64")
        )
    }

    /// Read a dispatched truth value: a plain boolean, or a constant
    /// wrapping one
    pub(crate) fn truth(v: &Value, algorithm: &str) -> Result<bool> {
        match v {
            Value::Bool(b) => Ok(*b),
            Value::Const { value, .. } => value.expect_bool(algorithm),
            other => Err(DispatchError::Payload {
                algorithm: algorithm.to_string(),
                expected: "a boolean or constant boolean".to_string(),
                found: other.tag().to_string(),
            }),
        }
    }

    /// Re-lift a derived truth value: results stay constants when the
    /// dispatch tag was one
    pub(crate) fn lift_bool(tag: &Tag, b: bool) -> Value {
        if tag.is_constant() {
            Value::constant(CANONICAL_WRAPPER, Value::Bool(b))
        } else {
            Value::Bool(b)
        }
    }
}
