//! Searchable: locating elements
//!
//! Minimal complete definition: `find_if`. Any Foldable gets it by
//! scanning its elements in order. `find` searches by equality to a key
//! through the dispatched `equal`; `contains` reduces the answer to a
//! boolean. Absence is reported as the unit value — there is no optional
//! container family in the engine's scope.

use crate::foldable::{elements, foldable_ready};
use crate::support::truth;
use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, Registry, RegistryBuilder, Tag,
    Value,
};

/// Name of the Searchable concept
pub const SEARCHABLE: &str = "Searchable";

fn searchable_ready(registry: &Registry, tag: &Tag) -> bool {
    registry.strategy_concrete(SEARCHABLE, "find_if", tag)
        || foldable_ready(registry, tag)
}

pub fn install(builder: &mut RegistryBuilder) -> std::result::Result<(), BuildError> {
    builder.algorithm("find_if", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("find", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("contains", Dispatch::Unary, Arity::Exact(2))?;

    builder.concept(ConceptDef::new(SEARCHABLE).strategy("find_if", &["find_if"]))?;

    builder.derive_when(
        "find_if",
        "searchable::find_if",
        foldable_ready,
        |registry, _, args| {
            let pred = args[1].expect_fn("find_if")?;
            for item in elements(registry, &args[0])? {
                let hit = pred.invoke(registry, std::slice::from_ref(&item))?;
                if truth(&hit, "find_if")? {
                    return Ok(item);
                }
            }
            Ok(Value::Unit)
        },
    )?;

    builder.derive_when(
        "find",
        "searchable::find",
        searchable_ready,
        |registry, _, args| {
            let key = args[1].clone();
            let matches_key = Value::fn1("find::matches", move |registry, x| {
                let eq = registry.call("equal", &[x.clone(), key.clone()])?;
                Ok(Value::Bool(truth(&eq, "find")?))
            });
            registry.call("find_if", &[args[0].clone(), matches_key])
        },
    )?;

    builder.derive_when(
        "contains",
        "searchable::contains",
        searchable_ready,
        |registry, _, args| {
            let found = registry.call("find", args)?;
            Ok(Value::Bool(found != Value::Unit))
        },
    )?;

    Ok(())
}
