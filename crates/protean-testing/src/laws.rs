//! Law suites
//!
//! Concepts promise algebraic laws the engine checks only by convention.
//! These suites run the laws over sample values against a finalized
//! registry; adapters call them from their tests.

use protean_core::functional::{compose, id};
use protean_core::{DispatchError, Registry, Value};
use thiserror::Error;

/// A law that did not hold, or an engine failure while checking one
#[derive(Debug, Error)]
#[error("law `{law}` violated: {detail}")]
pub struct LawViolation {
    pub law: String,
    pub detail: String,
}

pub type LawResult = Result<(), LawViolation>;

fn violation(law: &str, detail: String) -> LawViolation {
    LawViolation {
        law: law.to_string(),
        detail,
    }
}

fn run(law: &str, result: Result<Value, DispatchError>) -> Result<Value, LawViolation> {
    result.map_err(|e| violation(law, e.to_string()))
}

fn truthy(law: &str, v: &Value) -> Result<bool, LawViolation> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Const { value, .. } => match value.as_ref() {
            Value::Bool(b) => Ok(*b),
            other => Err(violation(law, format!("non-boolean constant {:?}", other))),
        },
        other => Err(violation(law, format!("non-boolean result {:?}", other))),
    }
}

fn expect(law: &str, cond: bool, detail: impl FnOnce() -> String) -> LawResult {
    if cond {
        Ok(())
    } else {
        Err(violation(law, detail()))
    }
}

/// Comparable: reflexivity, symmetry, and agreement of `not_equal`
pub fn comparable(registry: &Registry, samples: &[Value]) -> LawResult {
    for x in samples {
        let eq = run("reflexivity", registry.call("equal", &[x.clone(), x.clone()]))?;
        expect("reflexivity", truthy("reflexivity", &eq)?, || {
            format!("equal({:?}, {:?}) was false", x, x)
        })?;
    }
    for x in samples {
        for y in samples {
            let xy = run("symmetry", registry.call("equal", &[x.clone(), y.clone()]))?;
            let yx = run("symmetry", registry.call("equal", &[y.clone(), x.clone()]))?;
            expect(
                "symmetry",
                truthy("symmetry", &xy)? == truthy("symmetry", &yx)?,
                || format!("equal({:?}, {:?}) asymmetric", x, y),
            )?;
            let ne = run(
                "not_equal",
                registry.call("not_equal", &[x.clone(), y.clone()]),
            )?;
            expect(
                "not_equal",
                truthy("not_equal", &ne)? != truthy("not_equal", &xy)?,
                || format!("not_equal disagrees with equal for ({:?}, {:?})", x, y),
            )?;
        }
    }
    Ok(())
}

/// Orderable: irreflexivity, asymmetry, transitivity, and coherence of
/// the derived comparisons
pub fn orderable(registry: &Registry, samples: &[Value]) -> LawResult {
    for x in samples {
        let lt = run(
            "irreflexivity",
            registry.call("less", &[x.clone(), x.clone()]),
        )?;
        expect("irreflexivity", !truthy("irreflexivity", &lt)?, || {
            format!("less({:?}, {:?}) was true", x, x)
        })?;
    }
    for x in samples {
        for y in samples {
            let xy = run("asymmetry", registry.call("less", &[x.clone(), y.clone()]))?;
            let yx = run("asymmetry", registry.call("less", &[y.clone(), x.clone()]))?;
            expect(
                "asymmetry",
                !(truthy("asymmetry", &xy)? && truthy("asymmetry", &yx)?),
                || format!("less({:?}, {:?}) both ways", x, y),
            )?;
            let le = run(
                "less_equal",
                registry.call("less_equal", &[x.clone(), y.clone()]),
            )?;
            expect(
                "less_equal",
                truthy("less_equal", &le)? == !truthy("less_equal", &yx)?,
                || format!("less_equal incoherent for ({:?}, {:?})", x, y),
            )?;
        }
    }
    for x in samples {
        for y in samples {
            for z in samples {
                let xy = run("transitivity", registry.call("less", &[x.clone(), y.clone()]))?;
                let yz = run("transitivity", registry.call("less", &[y.clone(), z.clone()]))?;
                if truthy("transitivity", &xy)? && truthy("transitivity", &yz)? {
                    let xz = run(
                        "transitivity",
                        registry.call("less", &[x.clone(), z.clone()]),
                    )?;
                    expect("transitivity", truthy("transitivity", &xz)?, || {
                        format!("less not transitive over ({:?}, {:?}, {:?})", x, y, z)
                    })?;
                }
            }
        }
    }
    Ok(())
}

fn semantically_equal(
    registry: &Registry,
    law: &str,
    x: &Value,
    y: &Value,
) -> Result<bool, LawViolation> {
    let eq = run(law, registry.call("equal", &[x.clone(), y.clone()]))?;
    truthy(law, &eq)
}

/// Monoid: identity on both sides, associativity
pub fn monoid(registry: &Registry, samples: &[Value]) -> LawResult {
    for x in samples {
        let zero = run("identity", registry.nullary("zero", &x.tag()))?;
        let left = run(
            "identity",
            registry.call("plus", &[zero.clone(), x.clone()]),
        )?;
        let right = run("identity", registry.call("plus", &[x.clone(), zero]))?;
        expect(
            "identity",
            semantically_equal(registry, "identity", &left, x)?
                && semantically_equal(registry, "identity", &right, x)?,
            || format!("zero is not an identity for {:?}", x),
        )?;
    }
    for x in samples {
        for y in samples {
            for z in samples {
                let xy = run(
                    "associativity",
                    registry.call("plus", &[x.clone(), y.clone()]),
                )?;
                let yz = run(
                    "associativity",
                    registry.call("plus", &[y.clone(), z.clone()]),
                )?;
                let left = run("associativity", registry.call("plus", &[xy, z.clone()]))?;
                let right = run("associativity", registry.call("plus", &[x.clone(), yz]))?;
                expect(
                    "associativity",
                    semantically_equal(registry, "associativity", &left, &right)?,
                    || format!("plus not associative over ({:?}, {:?}, {:?})", x, y, z),
                )?;
            }
        }
    }
    Ok(())
}

/// Group: every element cancels with its negation
pub fn group(registry: &Registry, samples: &[Value]) -> LawResult {
    for x in samples {
        let negated = run("inverse", registry.call("negate", &[x.clone()]))?;
        let sum = run("inverse", registry.call("plus", &[x.clone(), negated]))?;
        let zero = run("inverse", registry.nullary("zero", &x.tag()))?;
        expect(
            "inverse",
            semantically_equal(registry, "inverse", &sum, &zero)?,
            || format!("{:?} does not cancel with its negation", x),
        )?;
    }
    Ok(())
}

/// Functor: mapping identity changes nothing, mapping composes
pub fn functor(registry: &Registry, containers: &[Value]) -> LawResult {
    let inc = || Value::fn1("inc", |_, x| Ok(Value::I64(x.expect_i64("inc")? + 1)));
    let double = || Value::fn1("double", |_, x| Ok(Value::I64(x.expect_i64("double")? * 2)));
    for xs in containers {
        let mapped = run(
            "functor identity",
            registry.call("transform", &[xs.clone(), id()]),
        )?;
        expect("functor identity", &mapped == xs, || {
            format!("transform(id) changed {:?}", xs)
        })?;

        let composed = run(
            "functor composition",
            registry.call("transform", &[xs.clone(), compose(double(), inc())]),
        )?;
        let staged_inner = run(
            "functor composition",
            registry.call("transform", &[xs.clone(), inc()]),
        )?;
        let staged = run(
            "functor composition",
            registry.call("transform", &[staged_inner, double()]),
        )?;
        expect("functor composition", composed == staged, || {
            format!("transform does not compose over {:?}", xs)
        })?;
    }
    Ok(())
}

/// Foldable: two containers with the same elements agree on the whole
/// derived surface, whatever their minimal definitions
pub fn foldable_agreement(registry: &Registry, a: &Value, b: &Value) -> LawResult {
    for algorithm in ["length", "minimum", "maximum", "sum", "is_empty"] {
        let va = run(algorithm, registry.call(algorithm, &[a.clone()]));
        let vb = run(algorithm, registry.call(algorithm, &[b.clone()]));
        match (va, vb) {
            (Ok(va), Ok(vb)) => expect(algorithm, va == vb, || {
                format!("{} disagrees: {:?} vs {:?}", algorithm, va, vb)
            })?,
            // Both failing the same way (e.g. empty extrema) is agreement
            (Err(_), Err(_)) => {}
            (va, vb) => {
                return Err(violation(
                    algorithm,
                    format!("one strategy failed: {:?} vs {:?}", va.is_ok(), vb.is_ok()),
                ))
            }
        }
    }
    Ok(())
}
