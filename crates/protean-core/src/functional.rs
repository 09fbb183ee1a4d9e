//! Small functional combinators over callable values
//!
//! Derivations and tests compose behavior out of these instead of
//! hand-rolling closures at every site.

use crate::error::Result;
use crate::value::Value;

/// The identity callable
pub fn id() -> Value {
    Value::fn1("id", |_, x| Ok(x.clone()))
}

/// A callable ignoring its arguments and returning a fixed value
pub fn always(v: Value) -> Value {
    Value::native("always", move |_, _| Ok(v.clone()))
}

/// Function composition: `compose(f, g)(x) == f(g(x))`
pub fn compose(f: Value, g: Value) -> Value {
    Value::fn1("compose", move |registry, x| {
        let g = g.expect_fn("compose")?;
        let f = f.expect_fn("compose")?;
        let inner = g.invoke(registry, std::slice::from_ref(x))?;
        f.invoke(registry, &[inner])
    })
}

/// Partial application of the first argument
pub fn partial(f: Value, x: Value) -> Value {
    Value::native("partial", move |registry, args| {
        let f = f.expect_fn("partial")?;
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(x.clone());
        full.extend_from_slice(args);
        f.invoke(registry, &full)
    })
}

/// Swap the first two arguments of a binary callable
pub fn flip(f: Value) -> Value {
    Value::fn2("flip", move |registry, x, y| {
        let f = f.expect_fn("flip")?;
        f.invoke(registry, &[y.clone(), x.clone()])
    })
}

/// Invoke a callable value on arguments
pub fn apply(registry: &crate::registry::Registry, f: &Value, args: &[Value]) -> Result<Value> {
    f.expect_fn("apply")?.invoke(registry, args)
}
