//! Deliberately minimal families
//!
//! Each supplies exactly one minimal primitive set and nothing else, so
//! tests can pin down that every alternative definition grows the same
//! derived surface: `unpack_seq` models Foldable through `unpack` alone,
//! `iter_seq` models Iterable through head/tail/is_empty and gains its
//! fold by iteration.

use protean_core::{BuildError, DispatchError, RegistryBuilder, Tag, Value};

/// Tag of the unpack-only family
pub fn unpack_tag() -> Tag {
    Tag::named("unpack_seq")
}

/// Tag of the iteration-only family
pub fn iter_tag() -> Tag {
    Tag::named("iter_seq")
}

pub fn unpack_seq(items: Vec<Value>) -> Value {
    Value::seq(unpack_tag(), items)
}

pub fn iter_seq(items: Vec<Value>) -> Value {
    Value::seq(iter_tag(), items)
}

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.implement(
        "unpack",
        unpack_tag(),
        "unpack_seq::unpack",
        |registry, _, args| {
            let items = args[0].expect_seq("unpack")?;
            args[1].expect_fn("unpack")?.invoke(registry, items)
        },
    )?;

    builder.implement("head", iter_tag(), "iter_seq::head", |_, _, args| {
        args[0]
            .expect_seq("head")?
            .first()
            .cloned()
            .ok_or_else(|| DispatchError::EmptySequence {
                algorithm: "head".to_string(),
            })
    })?;

    builder.implement("tail", iter_tag(), "iter_seq::tail", |_, tag, args| {
        let items = args[0].expect_seq("tail")?;
        if items.is_empty() {
            return Err(DispatchError::EmptySequence {
                algorithm: "tail".to_string(),
            });
        }
        Ok(Value::seq(tag.clone(), items[1..].to_vec()))
    })?;

    builder.implement("is_empty", iter_tag(), "iter_seq::is_empty", |_, _, args| {
        Ok(Value::Bool(args[0].expect_seq("is_empty")?.is_empty()))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_core::{Provenance, Registry, RegistryBuilder};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        protean_core::constant::install(&mut builder).unwrap();
        protean_concepts::install(&mut builder).unwrap();
        crate::install(&mut builder).unwrap();
        builder.finalize().unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|n| Value::I64(*n)).collect()
    }

    #[test]
    fn test_both_families_model_foldable() {
        let registry = registry();
        assert!(registry.models("Foldable", &unpack_tag()).unwrap());
        assert!(registry.models("Foldable", &iter_tag()).unwrap());
        // But not Sequence: neither can be rebuilt
        assert!(!registry.models("Sequence", &unpack_tag()).unwrap());
        assert!(!registry.models("Sequence", &iter_tag()).unwrap());
    }

    #[test]
    fn test_fold_provenance_names_the_source() {
        let registry = registry();
        let info = registry.implementation("fold", &unpack_tag()).unwrap();
        assert_eq!(info.provenance, Provenance::Derived);
        assert_eq!(info.origin, "foldable::fold_from_unpack");

        let info = registry.implementation("fold", &iter_tag()).unwrap();
        assert_eq!(info.origin, "foldable::fold_from_iteration");
    }

    #[test]
    fn test_derived_surface_agrees() {
        let registry = registry();
        let a = unpack_seq(ints(&[5, 2, 9]));
        let b = iter_seq(ints(&[5, 2, 9]));
        for algorithm in ["length", "minimum", "maximum", "sum"] {
            let va = registry.call(algorithm, &[a.clone()]).unwrap();
            let vb = registry.call(algorithm, &[b.clone()]).unwrap();
            assert_eq!(va, vb, "{}", algorithm);
        }
    }

    #[test]
    fn test_iterable_only_family_keeps_its_concrete_is_empty() {
        let registry = registry();
        let info = registry.implementation("is_empty", &iter_tag()).unwrap();
        assert_eq!(info.provenance, Provenance::Concrete);
        let info = registry.implementation("is_empty", &unpack_tag()).unwrap();
        assert_eq!(info.provenance, Provenance::Derived);
    }
}
