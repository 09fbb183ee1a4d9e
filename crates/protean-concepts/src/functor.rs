//! Functor: structure-preserving mapping
//!
//! Two minimal complete definitions: `transform` (map a function over
//! every element) or `adjust` (map a function over the elements satisfying
//! a predicate). Either derives the other: `transform` is `adjust` with an
//! always-true predicate, `adjust` is `transform` with a conditional
//! function. `replace` and `fill` come for free.

use crate::support::truth;
use protean_core::functional::always;
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, Registry, RegistryBuilder, Tag,
    Value,
};

/// Name of the Functor concept
pub const FUNCTOR: &str = "Functor";

/// Whether a mapping operation is reachable without generic defaults:
/// either Functor strategy, or the sequence rendering (rebuild + fold)
pub(crate) fn functor_ready(registry: &Registry, tag: &Tag) -> bool {
    registry.strategy_concrete(FUNCTOR, "transform", tag)
        || registry.strategy_concrete(FUNCTOR, "adjust", tag)
        || crate::sequence::sequence_functor_ready(registry, tag)
}

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.algorithm("transform", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("adjust", Dispatch::Unary, Arity::Exact(3))?;
    builder.algorithm("replace", Dispatch::Unary, Arity::Exact(3))?;
    builder.algorithm("fill", Dispatch::Unary, Arity::Exact(2))?;

    builder.concept(
        ConceptDef::new(FUNCTOR)
            .strategy("transform", &["transform"])
            .strategy("adjust", &["adjust"]),
    )?;

    // transform via adjust with an always-true predicate
    builder.derive_when(
        "transform",
        "functor::transform_from_adjust",
        |registry, tag| registry.strategy_concrete(FUNCTOR, "adjust", tag),
        |registry, _, args| {
            registry.call(
                "adjust",
                &[
                    args[0].clone(),
                    always(Value::Bool(true)),
                    args[1].clone(),
                ],
            )
        },
    )?;

    // adjust via transform with a conditional function
    builder.derive_when(
        "adjust",
        "functor::adjust_from_transform",
        functor_ready,
        |registry, _, args| {
            let pred = args[1].clone();
            let f = args[2].clone();
            let conditional = Value::fn1("adjust::conditional", move |registry, x| {
                let keep = pred
                    .expect_fn("adjust")?
                    .invoke(registry, std::slice::from_ref(x))?;
                if truth(&keep, "adjust")? {
                    f.expect_fn("adjust")?.invoke(registry, std::slice::from_ref(x))
                } else {
                    Ok(x.clone())
                }
            });
            registry.call("transform", &[args[0].clone(), conditional])
        },
    )?;

    builder.derive_when(
        "replace",
        "functor::replace",
        functor_ready,
        |registry, _, args| {
            registry.call(
                "adjust",
                &[args[0].clone(), args[1].clone(), always(args[2].clone())],
            )
        },
    )?;

    builder.derive_when(
        "fill",
        "functor::fill",
        functor_ready,
        |registry, _, args| {
            registry.call("transform", &[args[0].clone(), always(args[1].clone())])
        },
    )?;

    Ok(())
}
