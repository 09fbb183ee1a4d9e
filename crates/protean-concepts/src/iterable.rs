//! Iterable: ordered element-at-a-time access
//!
//! Minimal complete definition: `head`, `tail`, `is_empty`. Positional
//! access (`at`, `drop`, `last`) derives by walking. An Iterable also
//! provides the Foldable fold by iteration; that bridge lives in the
//! foldable module with the other fold sources.

use crate::support::truth;
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, DispatchError, Registry,
    RegistryBuilder, Tag, Value,
};

/// Name of the Iterable concept
pub const ITERABLE: &str = "Iterable";

pub(crate) fn iterable_ready(registry: &Registry, tag: &Tag) -> bool {
    registry.strategy_concrete(ITERABLE, "iterate", tag)
}

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.algorithm("head", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("tail", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("is_empty", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("at", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("drop", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("last", Dispatch::Unary, Arity::Exact(1))?;

    builder.concept(
        ConceptDef::new(ITERABLE).strategy("iterate", &["head", "tail", "is_empty"]),
    )?;

    builder.derive_when("at", "iterable::at", iterable_ready, |registry, _, args| {
        let n = args[1].expect_i64("at")?;
        let mut current = args[0].clone();
        for _ in 0..n {
            if truth(&registry.call("is_empty", &[current.clone()])?, "at")? {
                return Err(DispatchError::EmptySequence {
                    algorithm: "at".to_string(),
                });
            }
            current = registry.call("tail", &[current])?;
        }
        if truth(&registry.call("is_empty", &[current.clone()])?, "at")? {
            return Err(DispatchError::EmptySequence {
                algorithm: "at".to_string(),
            });
        }
        registry.call("head", &[current])
    })?;

    builder.derive_when(
        "drop",
        "iterable::drop",
        iterable_ready,
        |registry, _, args| {
            let n = args[1].expect_i64("drop")?;
            let mut current = args[0].clone();
            for _ in 0..n {
                if truth(&registry.call("is_empty", &[current.clone()])?, "drop")? {
                    break;
                }
                current = registry.call("tail", &[current])?;
            }
            Ok(current)
        },
    )?;

    builder.derive_when(
        "last",
        "iterable::last",
        iterable_ready,
        |registry, _, args| {
            let mut current = args[0].clone();
            if truth(&registry.call("is_empty", &[current.clone()])?, "last")? {
                return Err(DispatchError::EmptySequence {
                    algorithm: "last".to_string(),
                });
            }
            loop {
                let rest = registry.call("tail", &[current.clone()])?;
                if truth(&registry.call("is_empty", &[rest.clone()])?, "last")? {
                    return registry.call("head", &[current]);
                }
                current = rest;
            }
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_core::Registry;

    // A toy family modeling Iterable only
    pub(crate) fn with_chain(builder: &mut RegistryBuilder) {
        let tag = Tag::named("chain");
        builder
            .implement("head", tag.clone(), "chain::head", |_, _, args| {
                args[0]
                    .expect_seq("head")?
                    .first()
                    .cloned()
                    .ok_or_else(|| DispatchError::EmptySequence {
                        algorithm: "head".to_string(),
                    })
            })
            .unwrap();
        builder
            .implement("tail", tag.clone(), "chain::tail", |_, tag, args| {
                let items = args[0].expect_seq("tail")?;
                if items.is_empty() {
                    return Err(DispatchError::EmptySequence {
                        algorithm: "tail".to_string(),
                    });
                }
                Ok(Value::seq(tag.clone(), items[1..].to_vec()))
            })
            .unwrap();
        builder
            .implement("is_empty", tag, "chain::is_empty", |_, _, args| {
                Ok(Value::Bool(args[0].expect_seq("is_empty")?.is_empty()))
            })
            .unwrap();
    }

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        protean_core::constant::install(&mut builder).unwrap();
        crate::install(&mut builder).unwrap();
        with_chain(&mut builder);
        builder.finalize().unwrap()
    }

    fn chain(items: Vec<Value>) -> Value {
        Value::seq(Tag::named("chain"), items)
    }

    #[test]
    fn test_models_iterable() {
        let registry = registry();
        assert!(registry.models(ITERABLE, &Tag::named("chain")).unwrap());
        assert!(!registry.models(ITERABLE, &Tag::int32()).unwrap());
    }

    #[test]
    fn test_positional_access() {
        let registry = registry();
        let xs = chain(vec![Value::I64(10), Value::I64(20), Value::I64(30)]);
        let out = registry.call("at", &[xs.clone(), Value::I64(1)]).unwrap();
        assert_eq!(out, Value::I64(20));
        let out = registry.call("last", &[xs.clone()]).unwrap();
        assert_eq!(out, Value::I64(30));
        let out = registry.call("drop", &[xs, Value::I64(2)]).unwrap();
        assert_eq!(out, chain(vec![Value::I64(30)]));
    }

    #[test]
    fn test_empty_chain_errors() {
        let registry = registry();
        let err = registry.call("last", &[chain(vec![])]).unwrap_err();
        assert!(matches!(err, DispatchError::EmptySequence { .. }));
        let err = registry
            .call("at", &[chain(vec![]), Value::I64(0)])
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptySequence { .. }));
    }
}
