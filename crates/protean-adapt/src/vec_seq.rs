//! Vector-backed sequence
//!
//! The workhorse container: supplies a concrete left fold, `rebuild`, and
//! `is_empty`, plus pairwise equality through the engine. Everything else
//! — length, quantifiers, extrema, transform, filter, stable sort — is
//! derived.

use protean_concepts::foldable;
use protean_core::{BuildError, RegistryBuilder, Tag, Value};

/// Tag of the vector-backed sequence family
pub fn tag() -> Tag {
    Tag::named("vec_seq")
}

/// Build a sequence from elements
pub fn vec_seq(items: Vec<Value>) -> Value {
    Value::seq(tag(), items)
}

/// Build a sequence of i64 values
pub fn of_i64(values: &[i64]) -> Value {
    vec_seq(values.iter().map(|n| Value::I64(*n)).collect())
}

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.implement("fold", tag(), "vec_seq::fold", |registry, _, args| {
        let items = args[0].expect_seq("fold")?;
        let f = args[2].expect_fn("fold")?;
        let mut acc = args[1].clone();
        for item in items {
            acc = f.invoke(registry, &[acc, item.clone()])?;
        }
        Ok(acc)
    })?;

    builder.implement("rebuild", tag(), "vec_seq::rebuild", |_, tag, args| {
        Ok(Value::seq(tag.clone(), args.to_vec()))
    })?;

    builder.implement("is_empty", tag(), "vec_seq::is_empty", |_, _, args| {
        Ok(Value::Bool(args[0].expect_seq("is_empty")?.is_empty()))
    })?;

    // Pairwise equality through the dispatched equal, so element families
    // keep their own comparison semantics
    builder.implement_pair(
        "equal",
        (tag(), tag()),
        "vec_seq::equal",
        |registry, _, args| {
            let xs = args[0].expect_seq("equal")?;
            let ys = args[1].expect_seq("equal")?;
            if xs.len() != ys.len() {
                return Ok(Value::Bool(false));
            }
            for (x, y) in xs.iter().zip(ys) {
                let eq = registry.call("equal", &[x.clone(), y.clone()])?;
                let same = match &eq {
                    Value::Const { value, .. } => value.expect_bool("equal")?,
                    other => other.expect_bool("equal")?,
                };
                if !same {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        },
    )?;

    Ok(())
}

/// Collect a sequence value back into plain elements
pub fn elements(
    registry: &protean_core::Registry,
    xs: &Value,
) -> protean_core::Result<Vec<Value>> {
    foldable::elements(registry, xs)
}
