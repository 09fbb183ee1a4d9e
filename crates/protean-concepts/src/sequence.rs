//! Sequence: containers rebuildable from their elements
//!
//! Minimal complete definition: `rebuild` — reconstruct an instance of the
//! family from a list of elements. Combined with a fold source this
//! unlocks the structure-editing surface: filter, reverse, append, concat,
//! and a stable sort over the dispatched ordering. It also gives such
//! families their Functor transform, with the homogeneity of the result
//! enforced.

use crate::foldable::{elements, foldable_ready};
use crate::support::truth;
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, DispatchError, FnValue, Registry,
    RegistryBuilder, Result, Tag, Value,
};

/// Name of the Sequence concept
pub const SEQUENCE: &str = "Sequence";

/// Whether the sequence rendering of Functor applies: a concrete rebuild
/// plus a reachable fold
pub(crate) fn sequence_functor_ready(registry: &Registry, tag: &Tag) -> bool {
    registry.strategy_concrete(SEQUENCE, "rebuild", tag)
        && foldable_ready(registry, tag)
}

fn sequence_ready(registry: &Registry, tag: &Tag) -> bool {
    sequence_functor_ready(registry, tag)
}

// Stable merge sort; an element of the right half may only overtake when
// strictly smaller under the comparator.
fn merge_sort(
    registry: &Registry,
    mut items: Vec<Value>,
    compare: &FnValue,
) -> Result<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(registry, items, compare)?;
    let right = merge_sort(registry, right, compare)?;

    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut li, mut ri) = (0, 0);
    while li < left.len() && ri < right.len() {
        let overtakes =
            compare.invoke(registry, &[right[ri].clone(), left[li].clone()])?;
        if truth(&overtakes, "sort_by")? {
            out.push(right[ri].clone());
            ri += 1;
        } else {
            out.push(left[li].clone());
            li += 1;
        }
    }
    out.extend_from_slice(&left[li..]);
    out.extend_from_slice(&right[ri..]);
    Ok(out)
}

pub fn install(builder: &mut RegistryBuilder) -> std::result::Result<(), BuildError> {
    builder.algorithm("rebuild", Dispatch::ByTag, Arity::AtLeast(0))?;
    builder.algorithm("filter", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("reverse", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("append", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("concat", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("sort", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("sort_by", Dispatch::Unary, Arity::Exact(2))?;

    builder.concept(
        ConceptDef::new(SEQUENCE)
            .refines(crate::foldable::FOLDABLE)
            .refines(crate::functor::FUNCTOR)
            .strategy("rebuild", &["rebuild"]),
    )?;

    // The sequence rendering of Functor's transform: map, check the
    // results stay homogeneous, rebuild. Containers modeling the adjust
    // strategy keep their own mapping instead.
    builder.derive_when(
        "transform",
        "sequence::transform",
        |registry, tag| {
            sequence_functor_ready(registry, tag)
                && !registry.strategy_concrete(crate::functor::FUNCTOR, "adjust", tag)
                && !registry.strategy_concrete(crate::functor::FUNCTOR, "transform", tag)
        },
        |registry, tag, args| {
            let f = args[1].expect_fn("transform")?;
            let mut out = Vec::new();
            let mut expected: Option<Tag> = None;
            for item in elements(registry, &args[0])? {
                let mapped = f.invoke(registry, &[item])?;
                let found = mapped.tag();
                match &expected {
                    None => expected = Some(found),
                    Some(expected) if *expected == found => {}
                    Some(expected) => {
                        return Err(DispatchError::NonUniformElements {
                            algorithm: "transform".to_string(),
                            expected: expected.clone(),
                            found,
                        })
                    }
                }
                out.push(mapped);
            }
            registry.invoke_on("rebuild", tag, &out)
        },
    )?;

    builder.derive_when(
        "filter",
        "sequence::filter",
        sequence_ready,
        |registry, tag, args| {
            let pred = args[1].expect_fn("filter")?;
            let mut kept = Vec::new();
            for item in elements(registry, &args[0])? {
                let hit = pred.invoke(registry, std::slice::from_ref(&item))?;
                if truth(&hit, "filter")? {
                    kept.push(item);
                }
            }
            registry.invoke_on("rebuild", tag, &kept)
        },
    )?;

    builder.derive_when(
        "reverse",
        "sequence::reverse",
        sequence_ready,
        |registry, tag, args| {
            let mut items = elements(registry, &args[0])?;
            items.reverse();
            registry.invoke_on("rebuild", tag, &items)
        },
    )?;

    builder.derive_when(
        "append",
        "sequence::append",
        sequence_ready,
        |registry, tag, args| {
            let mut items = elements(registry, &args[0])?;
            items.push(args[1].clone());
            registry.invoke_on("rebuild", tag, &items)
        },
    )?;

    builder.derive_when(
        "concat",
        "sequence::concat",
        sequence_ready,
        |registry, tag, args| {
            let mut items = elements(registry, &args[0])?;
            items.extend(elements(registry, &args[1])?);
            registry.invoke_on("rebuild", tag, &items)
        },
    )?;

    builder.derive_when(
        "sort_by",
        "sequence::sort_by",
        sequence_ready,
        |registry, tag, args| {
            let compare = args[1].expect_fn("sort_by")?;
            let items = elements(registry, &args[0])?;
            let sorted = merge_sort(registry, items, compare)?;
            registry.invoke_on("rebuild", tag, &sorted)
        },
    )?;

    builder.derive_when(
        "sort",
        "sequence::sort",
        sequence_ready,
        |registry, _, args| {
            let by_less = Value::fn2("sort::less", |registry, x, y| {
                let lt = registry.call("less", &[x.clone(), y.clone()])?;
                Ok(Value::Bool(truth(&lt, "sort")?))
            });
            registry.call("sort_by", &[args[0].clone(), by_less])
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_core::Provenance;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        protean_core::constant::install(&mut builder).unwrap();
        crate::install(&mut builder).unwrap();

        let tag = Tag::named("row");
        builder
            .implement("fold", tag.clone(), "row::fold", |registry, _, args| {
                let items = args[0].expect_seq("fold")?;
                let f = args[2].expect_fn("fold")?;
                let mut acc = args[1].clone();
                for item in items {
                    acc = f.invoke(registry, &[acc, item.clone()])?;
                }
                Ok(acc)
            })
            .unwrap();
        builder
            .implement("rebuild", tag, "row::rebuild", |_, tag, args| {
                Ok(Value::seq(tag.clone(), args.to_vec()))
            })
            .unwrap();
        builder.finalize().unwrap()
    }

    fn row(values: &[i64]) -> Value {
        Value::seq(
            Tag::named("row"),
            values.iter().map(|n| Value::I64(*n)).collect(),
        )
    }

    #[test]
    fn test_models_sequence() {
        let registry = registry();
        assert!(registry.models(SEQUENCE, &Tag::named("row")).unwrap());
        assert!(registry
            .models(crate::functor::FUNCTOR, &Tag::named("row"))
            .unwrap());
    }

    #[test]
    fn test_transform_is_the_sequence_rendering() {
        let registry = registry();
        let inc = Value::fn1("inc", |_, x| Ok(Value::I64(x.expect_i64("inc")? + 1)));
        let out = registry
            .call("transform", &[row(&[1, 2, 3]), inc])
            .unwrap();
        assert_eq!(out, row(&[2, 3, 4]));

        let info = registry
            .implementation("transform", &Tag::named("row"))
            .unwrap();
        assert_eq!(info.provenance, Provenance::Derived);
        assert_eq!(info.origin, "sequence::transform");
    }

    #[test]
    fn test_transform_rejects_mixed_result_tags() {
        let registry = registry();
        let drift = Value::fn1("drift", |_, x| {
            let n = x.expect_i64("drift")?;
            if n % 2 == 0 {
                Ok(Value::string(n.to_string()))
            } else {
                Ok(Value::I64(n))
            }
        });
        let err = registry
            .call("transform", &[row(&[1, 2]), drift])
            .unwrap_err();
        assert!(matches!(err, DispatchError::NonUniformElements { .. }));
    }

    #[test]
    fn test_filter_reverse_append_concat() {
        let registry = registry();
        let odd = Value::fn1("odd", |_, x| {
            Ok(Value::Bool(x.expect_i64("odd")? % 2 != 0))
        });
        assert_eq!(
            registry.call("filter", &[row(&[1, 2, 3, 4]), odd]).unwrap(),
            row(&[1, 3])
        );
        assert_eq!(
            registry.call("reverse", &[row(&[1, 2, 3])]).unwrap(),
            row(&[3, 2, 1])
        );
        assert_eq!(
            registry
                .call("append", &[row(&[1, 2]), Value::I64(3)])
                .unwrap(),
            row(&[1, 2, 3])
        );
        assert_eq!(
            registry
                .call("concat", &[row(&[1]), row(&[2, 3])])
                .unwrap(),
            row(&[1, 2, 3])
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let registry = registry();
        // Keys equal under the ordering stay in input order: -0.0 and 0.0
        // compare equal but are distinguishable by their bits
        let xs = Value::seq(
            Tag::named("row"),
            vec![
                Value::F64(1.0),
                Value::F64(0.0),
                Value::F64(-0.0),
                Value::F64(0.5),
            ],
        );
        let out = registry.call("sort", &[xs]).unwrap();
        assert_eq!(
            out,
            Value::seq(
                Tag::named("row"),
                vec![
                    Value::F64(0.0),
                    Value::F64(-0.0),
                    Value::F64(0.5),
                    Value::F64(1.0),
                ]
            )
        );
    }

    #[test]
    fn test_sort_by_with_custom_ordering() {
        let registry = registry();
        let descending = Value::fn2("descending", |_, x, y| {
            Ok(Value::Bool(x.expect_i64("descending")? > y.expect_i64("descending")?))
        });
        let out = registry
            .call("sort_by", &[row(&[2, 3, 1]), descending])
            .unwrap();
        assert_eq!(out, row(&[3, 2, 1]));
    }
}
