//! Constant/value duality bridge
//!
//! A Constant is a tag whose payload is recoverable without consulting any
//! runtime state. The bridge supplies: the `value` extraction algorithm,
//! the Constant concept, and the two wrapper conversions every constant
//! family gets for free — unwrapping into the underlying plain tag, and
//! re-wrapping into another constant family over a convertible underlying.

use crate::concept::ConceptDef;
use crate::convert::EmbeddingRule;
use crate::error::{BuildError, DispatchError, Result};
use crate::registry::{Arity, Dispatch, Registry, RegistryBuilder};
use crate::tag::Tag;
use crate::value::Value;

/// Name of the Constant concept
pub const CONSTANT: &str = "Constant";

impl Registry {
    /// Extract the compile-time-known payload of a constant.
    ///
    /// Requires the tag to model Constant; anything else signals
    /// `NotAConstant` rather than `NoModel`, since the caller asked a
    /// constant-specific question.
    pub fn value(&self, v: &Value) -> Result<Value> {
        let tag = v.tag();
        if !self.models(CONSTANT, &tag)? {
            return Err(DispatchError::NotAConstant { tag });
        }
        self.call("value", std::slice::from_ref(v))
    }
}

/// Register the constant bridge into a builder
pub fn install(builder: &mut RegistryBuilder) -> std::result::Result<(), BuildError> {
    builder.algorithm("value", Dispatch::Unary, Arity::Exact(1))?;

    // Structural model: every constant-wrapper tag recovers its payload
    builder.implement_when(
        "value",
        "constant::value",
        |_, tag| tag.is_constant(),
        |_, tag, args| match &args[0] {
            Value::Const { value, .. } => Ok((**value).clone()),
            other => Err(DispatchError::Payload {
                algorithm: "value".to_string(),
                expected: format!("a constant of tag `{}`", tag),
                found: other.tag().to_string(),
            }),
        },
    )?;

    builder.concept(ConceptDef::new(CONSTANT).strategy("value", &["value"]))?;

    // Constant -> underlying plain tag: always available by unwrapping;
    // an embedding exactly when the payload conversion is one
    builder.conversion_when(
        "constant::unwrap",
        EmbeddingRule::FollowsPayload,
        |registry, to, from| {
            !to.is_constant()
                && from
                    .underlying()
                    .is_some_and(|u| registry.has_conversion(to, u))
        },
        |registry, to, v| {
            let payload = registry.value(v)?;
            registry.to(to, &payload)
        },
    );

    // Constant -> Constant over a convertible underlying: convert the
    // payload, then re-wrap in the target family
    builder.conversion_when(
        "constant::rewrap",
        EmbeddingRule::FollowsPayload,
        |registry, to, from| {
            match (to, from) {
                (Tag::Constant { underlying: tu, .. }, Tag::Constant { underlying: fu, .. }) => {
                    registry.has_conversion(tu, fu)
                }
                _ => false,
            }
        },
        |registry, to, v| {
            let (wrapper, target_underlying) = match to {
                Tag::Constant { wrapper, underlying } => (wrapper, underlying),
                other => {
                    return Err(DispatchError::NoConversion {
                        from: v.tag(),
                        to: other.clone(),
                    })
                }
            };
            let payload = registry.value(v)?;
            let converted = registry.to(target_underlying, &payload)?;
            Ok(Value::constant(wrapper.clone(), converted))
        },
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        install(&mut builder).unwrap();
        builder
            .conversion(
                Tag::int64(),
                Tag::int32(),
                EmbeddingRule::Embedding,
                "i32->i64",
                |_, _, v| Ok(Value::I64(v.expect_i64("to")?)),
            )
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_value_extraction() {
        let registry = registry();
        let c = Value::constant("int_const", Value::I32(5));
        assert_eq!(registry.value(&c).unwrap(), Value::I32(5));
    }

    #[test]
    fn test_value_on_plain_tag_is_not_a_constant() {
        let registry = registry();
        let err = registry.value(&Value::I32(5)).unwrap_err();
        assert_eq!(
            err,
            DispatchError::NotAConstant { tag: Tag::int32() }
        );
    }

    #[test]
    fn test_models_constant_structurally() {
        let registry = registry();
        let tag = Tag::constant("int_const", Tag::int32());
        assert!(registry.models(CONSTANT, &tag).unwrap());
        assert!(!registry.models(CONSTANT, &Tag::int32()).unwrap());
    }

    #[test]
    fn test_unwrap_conversion() {
        let registry = registry();
        let c = Value::constant("int_const", Value::I32(5));
        // To the exact underlying: identity payload conversion, an embedding
        assert_eq!(
            registry.to(&Tag::int32(), &c).unwrap(),
            Value::I32(5)
        );
        assert!(registry.is_embedded(
            &Tag::constant("int_const", Tag::int32()),
            &Tag::int32()
        ));
        // To a wider plain tag through the payload conversion
        assert_eq!(
            registry.to(&Tag::int64(), &c).unwrap(),
            Value::I64(5)
        );
    }

    #[test]
    fn test_rewrap_conversion() {
        let registry = registry();
        let c = Value::constant("int_const", Value::I32(5));
        let target = Tag::canonical(Tag::int64());
        let out = registry.to(&target, &c).unwrap();
        assert_eq!(out, Value::constant("canonical", Value::I64(5)));
        assert_eq!(out.tag(), target);
        // Wrapper-to-wrapper embedding follows the payload conversion
        assert!(registry.is_embedded(
            &Tag::constant("int_const", Tag::int32()),
            &target
        ));
    }

    #[test]
    fn test_round_trip_recovers_payload() {
        let registry = registry();
        let c = Value::constant("long_const", Value::I64(9));
        let payload = registry.value(&c).unwrap();
        let back = Value::constant("long_const", payload);
        assert_eq!(back, c);
    }
}
