//! Numeric tower: Monoid, Group, Ring, Enumerable
//!
//! Monoid: `zero` and `plus`. Group refines it with either `negate` or
//! `minus` — each derives the other. Ring adds `one` and `mult`, with
//! `power` derived by repeated multiplication. Enumerable is `succ` and
//! `pred` for the integral tags.
//!
//! Plain non-boolean arithmetic tags model the whole tower natively.
//! Constants over a modeled payload compute on their payloads and re-wrap
//! in their own family, so constant-ness survives arithmetic.

use protean_core::{
    Arity, BuildError, ConceptDef, Dispatch, DispatchError, Registry,
    RegistryBuilder, Result, Tag, Value,
};

use crate::support::{is_integral, is_numeric};

pub const MONOID: &str = "Monoid";
pub const GROUP: &str = "Group";
pub const RING: &str = "Ring";
pub const ENUMERABLE: &str = "Enumerable";

fn arith2(
    algorithm: &'static str,
    x: &Value,
    y: &Value,
    on_i32: fn(i32, i32) -> i32,
    on_i64: fn(i64, i64) -> i64,
    on_f64: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (x, y) {
        (Value::I32(a), Value::I32(b)) => Ok(Value::I32(on_i32(*a, *b))),
        (Value::I64(a), Value::I64(b)) => Ok(Value::I64(on_i64(*a, *b))),
        (Value::F64(a), Value::F64(b)) => Ok(Value::F64(on_f64(*a, *b))),
        (x, y) => Err(DispatchError::Payload {
            algorithm: algorithm.to_string(),
            expected: "two numerics of one tag".to_string(),
            found: format!("{}, {}", x.tag(), y.tag()),
        }),
    }
}

fn scalar_of(tag: &Tag, algorithm: &str, int_value: i64) -> Result<Value> {
    match tag {
        Tag::Foreign(name) if name == "i32" => Ok(Value::I32(int_value as i32)),
        Tag::Foreign(name) if name == "i64" => Ok(Value::I64(int_value)),
        Tag::Foreign(name) if name == "f64" => Ok(Value::F64(int_value as f64)),
        other => Err(DispatchError::Payload {
            algorithm: algorithm.to_string(),
            expected: "a numeric tag".to_string(),
            found: other.to_string(),
        }),
    }
}

/// Guard for constants whose payload models a concept
fn constant_over(
    concept: &'static str,
) -> impl Fn(&Registry, &Tag) -> bool + Send + Sync + 'static {
    move |registry, tag| {
        tag.is_constant()
            && tag
                .underlying()
                .is_some_and(|u| registry.models(concept, u).unwrap_or(false))
    }
}

fn rewrap(tag: &Tag, algorithm: &str, payload: Value) -> Result<Value> {
    match tag {
        Tag::Constant { wrapper, .. } => Ok(Value::constant(wrapper.clone(), payload)),
        other => Err(DispatchError::Payload {
            algorithm: algorithm.to_string(),
            expected: "a constant tag".to_string(),
            found: other.to_string(),
        }),
    }
}

pub fn install(builder: &mut RegistryBuilder) -> std::result::Result<(), BuildError> {
    builder.algorithm("zero", Dispatch::ByTag, Arity::Exact(0))?;
    builder.algorithm("plus", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("negate", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("minus", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("one", Dispatch::ByTag, Arity::Exact(0))?;
    builder.algorithm("mult", Dispatch::Binary, Arity::Exact(2))?;
    builder.algorithm("power", Dispatch::Unary, Arity::Exact(2))?;
    builder.algorithm("succ", Dispatch::Unary, Arity::Exact(1))?;
    builder.algorithm("pred", Dispatch::Unary, Arity::Exact(1))?;

    builder.concept(
        ConceptDef::new(MONOID).strategy("monoid", &["zero", "plus"]),
    )?;
    builder.concept(
        ConceptDef::new(GROUP)
            .refines(MONOID)
            .strategy("negate", &["negate"])
            .strategy("minus", &["minus"]),
    )?;
    builder.concept(
        ConceptDef::new(RING)
            .refines(GROUP)
            .strategy("ring", &["one", "mult"]),
    )?;
    builder.concept(
        ConceptDef::new(ENUMERABLE).strategy("enumerable", &["succ", "pred"]),
    )?;

    // Models for plain non-boolean arithmetic tags
    builder.implement_when(
        "zero",
        "numeric::zero",
        |_, tag| is_numeric(tag),
        |_, tag, _| scalar_of(tag, "zero", 0),
    )?;
    builder.implement_when(
        "one",
        "numeric::one",
        |_, tag| is_numeric(tag),
        |_, tag, _| scalar_of(tag, "one", 1),
    )?;
    builder.implement_when(
        "plus",
        "numeric::plus",
        |_, tag| is_numeric(tag),
        |_, _, args| {
            arith2("plus", &args[0], &args[1], |a, b| a + b, |a, b| a + b, |a, b| a + b)
        },
    )?;
    builder.implement_when(
        "mult",
        "numeric::mult",
        |_, tag| is_numeric(tag),
        |_, _, args| {
            arith2("mult", &args[0], &args[1], |a, b| a * b, |a, b| a * b, |a, b| a * b)
        },
    )?;
    builder.implement_when(
        "negate",
        "numeric::negate",
        |_, tag| is_numeric(tag),
        |_, _, args| match &args[0] {
            Value::I32(a) => Ok(Value::I32(-a)),
            Value::I64(a) => Ok(Value::I64(-a)),
            Value::F64(a) => Ok(Value::F64(-a)),
            other => Err(DispatchError::Payload {
                algorithm: "negate".to_string(),
                expected: "a numeric".to_string(),
                found: other.tag().to_string(),
            }),
        },
    )?;
    builder.implement_when(
        "succ",
        "numeric::succ",
        |_, tag| is_integral(tag),
        |_, _, args| match &args[0] {
            Value::I32(a) => Ok(Value::I32(a + 1)),
            Value::I64(a) => Ok(Value::I64(a + 1)),
            other => Err(DispatchError::Payload {
                algorithm: "succ".to_string(),
                expected: "an integral".to_string(),
                found: other.tag().to_string(),
            }),
        },
    )?;
    builder.implement_when(
        "pred",
        "numeric::pred",
        |_, tag| is_integral(tag),
        |_, _, args| match &args[0] {
            Value::I32(a) => Ok(Value::I32(a - 1)),
            Value::I64(a) => Ok(Value::I64(a - 1)),
            other => Err(DispatchError::Payload {
                algorithm: "pred".to_string(),
                expected: "an integral".to_string(),
                found: other.tag().to_string(),
            }),
        },
    )?;

    // Group bridges: either primitive derives the other
    builder.derive_when(
        "minus",
        "group::minus_from_negate",
        |registry, tag| registry.strategy_concrete(GROUP, "negate", tag),
        |registry, _, args| {
            let negated = registry.call("negate", &[args[1].clone()])?;
            registry.call("plus", &[args[0].clone(), negated])
        },
    )?;
    builder.derive_when(
        "negate",
        "group::negate_from_minus",
        |registry, tag| {
            registry.strategy_concrete(GROUP, "minus", tag)
                && !registry.strategy_concrete(GROUP, "negate", tag)
        },
        |registry, tag, args| {
            let zero = registry.nullary("zero", tag)?;
            registry.call("minus", &[zero, args[0].clone()])
        },
    )?;

    // power: repeated multiplication, non-negative integral exponent
    builder.derive_when(
        "power",
        "ring::power",
        |registry, tag| registry.strategy_concrete(RING, "ring", tag),
        |registry, tag, args| {
            let exponent = match &args[1] {
                Value::Const { value, .. } => value.expect_i64("power")?,
                other => other.expect_i64("power")?,
            };
            if exponent < 0 {
                return Err(DispatchError::Payload {
                    algorithm: "power".to_string(),
                    expected: "a non-negative exponent".to_string(),
                    found: exponent.to_string(),
                });
            }
            let mut acc = registry.nullary("one", tag)?;
            for _ in 0..exponent {
                acc = registry.call("mult", &[acc, args[0].clone()])?;
            }
            Ok(acc)
        },
    )?;

    // Models for constants over a modeled payload: compute on the
    // payloads, re-wrap in the same family
    builder.implement_when(
        "zero",
        "numeric::constant_zero",
        constant_over(MONOID),
        |registry, tag, _| {
            let underlying = tag.underlying().cloned().unwrap_or(Tag::unit());
            let zero = registry.nullary("zero", &underlying)?;
            rewrap(tag, "zero", zero)
        },
    )?;
    builder.implement_when(
        "one",
        "numeric::constant_one",
        constant_over(RING),
        |registry, tag, _| {
            let underlying = tag.underlying().cloned().unwrap_or(Tag::unit());
            let one = registry.nullary("one", &underlying)?;
            rewrap(tag, "one", one)
        },
    )?;
    builder.implement_when(
        "plus",
        "numeric::constant_plus",
        constant_over(MONOID),
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let y = registry.value(&args[1])?;
            let sum = registry.call("plus", &[x, y])?;
            rewrap(tag, "plus", sum)
        },
    )?;
    builder.implement_when(
        "mult",
        "numeric::constant_mult",
        constant_over(RING),
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let y = registry.value(&args[1])?;
            let product = registry.call("mult", &[x, y])?;
            rewrap(tag, "mult", product)
        },
    )?;
    builder.implement_when(
        "negate",
        "numeric::constant_negate",
        constant_over(GROUP),
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let negated = registry.call("negate", &[x])?;
            rewrap(tag, "negate", negated)
        },
    )?;
    builder.implement_when(
        "succ",
        "numeric::constant_succ",
        constant_over(ENUMERABLE),
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let next = registry.call("succ", &[x])?;
            rewrap(tag, "succ", next)
        },
    )?;
    builder.implement_when(
        "pred",
        "numeric::constant_pred",
        constant_over(ENUMERABLE),
        |registry, tag, args| {
            let x = registry.value(&args[0])?;
            let previous = registry.call("pred", &[x])?;
            rewrap(tag, "pred", previous)
        },
    )?;

    Ok(())
}
