//! Foldable: structures reducible to a summary value
//!
//! Two minimal complete definitions: `fold` (left fold with an initial
//! state) or `unpack` (hand every element to a variadic function). Each
//! bridges to the other, and an Iterable gets `fold` by iteration, so any
//! of the three primitive sets unlocks the whole derived surface: length,
//! counting, quantifiers, extrema, monoidal sums, iteration for effect.
//!
//! Derived extrema are stable: among elements equal under the ordering,
//! the first seen wins. There is no tie-break hook.

use crate::iterable::ITERABLE;
use crate::support::truth;
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, DispatchError, Registry,
    RegistryBuilder, Result, Tag, Value,
};

/// Name of the Foldable concept
pub const FOLDABLE: &str = "Foldable";

/// Whether a fold is reachable without generic defaults: a concrete fold,
/// a concrete unpack, or a concrete iteration strategy
pub(crate) fn foldable_ready(registry: &Registry, tag: &Tag) -> bool {
    registry.strategy_concrete(FOLDABLE, "fold", tag)
        || registry.strategy_concrete(FOLDABLE, "unpack", tag)
        || registry.strategy_concrete(ITERABLE, "iterate", tag)
}

/// Collect a foldable's elements into a plain vector, through its fold
pub fn elements(registry: &Registry, xs: &Value) -> Result<Vec<Value>> {
    let push = Value::fn2("elements::push", |_, acc, x| {
        let mut items = acc.clone().into_items("fold")?;
        items.push(x.clone());
        Ok(Value::list(items))
    });
    registry
        .call("fold", &[xs.clone(), Value::list(Vec::new()), push])?
        .into_items("fold")
}

pub fn install(builder: &mut RegistryBuilder) -> std::result::Result<(), BuildError> {
    builder.algorithm("fold", Dispatch::Unary, Arity::Exact(3))?;
    builder.algorithm("unpack", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("length", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("count_if", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("any_of", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("all_of", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("none_of", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("minimum", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("maximum", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("sum", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("product", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("for_each", Dispatch::Unary, Arity::Exact(2))?;

    builder.concept(
        ConceptDef::new(FOLDABLE)
            .strategy("fold", &["fold"])
            .strategy("unpack", &["unpack"]),
    )?;

    // Strategy bridges. Guards are strictly concrete so two strategies
    // bridging to each other can never recurse.
    builder.derive_when(
        "fold",
        "foldable::fold_from_unpack",
        |registry, tag| registry.strategy_concrete(FOLDABLE, "unpack", tag),
        |registry, _, args| {
            let init = args[1].clone();
            let f = args[2].clone();
            let folder = Value::native("fold::via_unpack", move |registry, elems| {
                let f = f.expect_fn("fold")?;
                let mut acc = init.clone();
                for elem in elems {
                    acc = f.invoke(registry, &[acc, elem.clone()])?;
                }
                Ok(acc)
            });
            registry.call("unpack", &[args[0].clone(), folder])
        },
    )?;

    builder.derive_when(
        "fold",
        "foldable::fold_from_iteration",
        |registry, tag| {
            registry.strategy_concrete(ITERABLE, "iterate", tag)
                && !registry.strategy_concrete(FOLDABLE, "unpack", tag)
        },
        |registry, _, args| {
            let f = args[2].expect_fn("fold")?;
            let mut acc = args[1].clone();
            let mut current = args[0].clone();
            loop {
                let empty = registry.call("is_empty", &[current.clone()])?;
                if truth(&empty, "fold")? {
                    return Ok(acc);
                }
                let head = registry.call("head", &[current.clone()])?;
                acc = f.invoke(registry, &[acc, head])?;
                current = registry.call("tail", &[current])?;
            }
        },
    )?;

    builder.derive_when(
        "unpack",
        "foldable::unpack_from_fold",
        foldable_ready,
        |registry, _, args| {
            let items = elements(registry, &args[0])?;
            args[1].expect_fn("unpack")?.invoke(registry, &items)
        },
    )?;

    // An Iterable answers emptiness directly; everything else counts
    builder.derive_when(
        "is_empty",
        "foldable::is_empty",
        foldable_ready,
        |registry, _, args| {
            let n = registry.call("length", &[args[0].clone()])?;
            Ok(Value::Bool(n.expect_i64("is_empty")? == 0))
        },
    )?;

    builder.derive_when(
        "length",
        "foldable::length",
        foldable_ready,
        |registry, _, args| {
            let count = Value::fn2("length::count", |_, acc, _| {
                Ok(Value::I64(acc.expect_i64("length")? + 1))
            });
            registry.call("fold", &[args[0].clone(), Value::I64(0), count])
        },
    )?;

    // count_if: fold with an accumulator incremented when the predicate holds
    builder.derive_when(
        "count_if",
        "foldable::count_if",
        foldable_ready,
        |registry, _, args| {
            let pred = args[1].clone();
            let step = Value::fn2("count_if::step", move |registry, acc, x| {
                let hit = pred
                    .expect_fn("count_if")?
                    .invoke(registry, std::slice::from_ref(x))?;
                let n = acc.expect_i64("count_if")?;
                Ok(Value::I64(if truth(&hit, "count_if")? { n + 1 } else { n }))
            });
            registry.call("fold", &[args[0].clone(), Value::I64(0), step])
        },
    )?;

    builder.derive_when(
        "any_of",
        "foldable::any_of",
        foldable_ready,
        |registry, _, args| {
            let pred = args[1].expect_fn("any_of")?;
            for item in elements(registry, &args[0])? {
                let hit = pred.invoke(registry, &[item])?;
                if truth(&hit, "any_of")? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        },
    )?;

    builder.derive_when(
        "all_of",
        "foldable::all_of",
        foldable_ready,
        |registry, _, args| {
            let pred = args[1].expect_fn("all_of")?;
            for item in elements(registry, &args[0])? {
                let hit = pred.invoke(registry, &[item])?;
                if !truth(&hit, "all_of")? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        },
    )?;

    builder.derive_when(
        "none_of",
        "foldable::none_of",
        foldable_ready,
        |registry, _, args| {
            let any = registry.call("any_of", args)?;
            Ok(Value::Bool(!truth(&any, "none_of")?))
        },
    )?;

    // minimum: fold carrying a running best; a strict `less` keeps the
    // first-seen element among equals
    builder.derive_when(
        "minimum",
        "foldable::minimum",
        foldable_ready,
        |registry, _, args| {
            let mut best: Option<Value> = None;
            for item in elements(registry, &args[0])? {
                best = Some(match best {
                    None => item,
                    Some(best) => {
                        let smaller = registry
                            .call("less", &[item.clone(), best.clone()])?;
                        if truth(&smaller, "minimum")? {
                            item
                        } else {
                            best
                        }
                    }
                });
            }
            best.ok_or_else(|| DispatchError::EmptySequence {
                algorithm: "minimum".to_string(),
            })
        },
    )?;

    builder.derive_when(
        "maximum",
        "foldable::maximum",
        foldable_ready,
        |registry, _, args| {
            let mut best: Option<Value> = None;
            for item in elements(registry, &args[0])? {
                best = Some(match best {
                    None => item,
                    Some(best) => {
                        let bigger = registry
                            .call("less", &[best.clone(), item.clone()])?;
                        if truth(&bigger, "maximum")? {
                            item
                        } else {
                            best
                        }
                    }
                });
            }
            best.ok_or_else(|| DispatchError::EmptySequence {
                algorithm: "maximum".to_string(),
            })
        },
    )?;

    // sum and product reduce with the element tag's Monoid and Ring
    builder.derive_when(
        "sum",
        "foldable::sum",
        foldable_ready,
        |registry, _, args| {
            let items = elements(registry, &args[0])?;
            let Some(first) = items.first() else {
                return Ok(Value::I64(0));
            };
            let mut acc = registry.nullary("zero", &first.tag())?;
            for item in items {
                acc = registry.call("plus", &[acc, item])?;
            }
            Ok(acc)
        },
    )?;

    builder.derive_when(
        "product",
        "foldable::product",
        foldable_ready,
        |registry, _, args| {
            let items = elements(registry, &args[0])?;
            let Some(first) = items.first() else {
                return Ok(Value::I64(1));
            };
            let mut acc = registry.nullary("one", &first.tag())?;
            for item in items {
                acc = registry.call("mult", &[acc, item])?;
            }
            Ok(acc)
        },
    )?;

    builder.derive_when(
        "for_each",
        "foldable::for_each",
        foldable_ready,
        |registry, _, args| {
            let f = args[1].expect_fn("for_each")?;
            for item in elements(registry, &args[0])? {
                f.invoke(registry, &[item])?;
            }
            Ok(Value::Unit)
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_core::Provenance;

    // Two deliberately minimal families: one supplies only fold, the
    // other only unpack. Both must grow the same derived surface.
    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        protean_core::constant::install(&mut builder).unwrap();
        crate::install(&mut builder).unwrap();

        builder
            .implement("fold", Tag::named("folded"), "folded::fold", |registry, _, args| {
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
            .implement("unpack", Tag::named("packed"), "packed::unpack", |registry, _, args| {
                let items = args[0].expect_seq("unpack")?;
                args[1].expect_fn("unpack")?.invoke(registry, items)
            })
            .unwrap();

        builder.finalize().unwrap()
    }

    fn folded(items: Vec<Value>) -> Value {
        Value::seq(Tag::named("folded"), items)
    }

    fn packed(items: Vec<Value>) -> Value {
        Value::seq(Tag::named("packed"), items)
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|n| Value::I64(*n)).collect()
    }

    #[test]
    fn test_both_strategies_model_foldable() {
        let registry = registry();
        assert!(registry.models(FOLDABLE, &Tag::named("folded")).unwrap());
        assert!(registry.models(FOLDABLE, &Tag::named("packed")).unwrap());
        assert!(!registry.models(FOLDABLE, &Tag::int32()).unwrap());
    }

    #[test]
    fn test_length_agrees_across_strategies() {
        let registry = registry();
        let via_fold = registry
            .call("length", &[folded(ints(&[4, 5, 6]))])
            .unwrap();
        let via_unpack = registry
            .call("length", &[packed(ints(&[4, 5, 6]))])
            .unwrap();
        assert_eq!(via_fold, Value::I64(3));
        assert_eq!(via_fold, via_unpack);
    }

    #[test]
    fn test_bridges_have_derived_provenance() {
        let registry = registry();
        let info = registry
            .implementation("fold", &Tag::named("packed"))
            .unwrap();
        assert_eq!(info.provenance, Provenance::Derived);
        assert_eq!(info.origin, "foldable::fold_from_unpack");

        let info = registry
            .implementation("unpack", &Tag::named("folded"))
            .unwrap();
        assert_eq!(info.origin, "foldable::unpack_from_fold");
    }

    #[test]
    fn test_quantifiers() {
        let registry = registry();
        let odd = || {
            Value::fn1("odd", |_, x| {
                Ok(Value::Bool(x.expect_i64("odd")? % 2 != 0))
            })
        };
        let xs = packed(ints(&[1, 2, 3]));
        assert_eq!(
            registry.call("any_of", &[xs.clone(), odd()]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry.call("all_of", &[xs.clone(), odd()]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            registry.call("none_of", &[xs.clone(), odd()]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            registry.call("count_if", &[xs, odd()]).unwrap(),
            Value::I64(2)
        );
    }

    #[test]
    fn test_minimum_keeps_first_of_equal_elements() {
        let registry = registry();
        // 0.0 and -0.0 are equal under the ordering but distinguishable
        // structurally; the first one seen must win
        let xs = folded(vec![Value::F64(0.0), Value::F64(-0.0), Value::F64(1.0)]);
        let out = registry.call("minimum", &[xs]).unwrap();
        assert_eq!(out, Value::F64(0.0));
    }

    #[test]
    fn test_minimum_of_empty_errors() {
        let registry = registry();
        let err = registry.call("minimum", &[folded(vec![])]).unwrap_err();
        assert!(matches!(err, DispatchError::EmptySequence { .. }));
    }

    #[test]
    fn test_is_empty_derived_from_length() {
        let registry = registry();
        assert_eq!(
            registry.call("is_empty", &[folded(vec![])]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry
                .call("is_empty", &[packed(ints(&[1]))])
                .unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_for_each_runs_in_order() {
        let registry = registry();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let record = Value::fn1("record", move |_, x| {
            sink.lock().unwrap().push(x.expect_i64("record")?);
            Ok(Value::Unit)
        });
        registry
            .call("for_each", &[folded(ints(&[7, 8, 9])), record])
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![7, 8, 9]);
    }
}
