//! Integral constant wrappers
//!
//! Two constant families over the integer tags: `int_const` over `i32` and
//! `long_const` over `i64`. The engine treats any `Value::Const` as
//! modeling Constant structurally, so these only need constructors; their
//! equality, ordering, and arithmetic come from the concept modules'
//! constant models, and their common-type behavior from the engine:
//! same family stays in-family, different families meet at the canonical
//! wrapper.

use protean_core::{Tag, Value};

/// Wrapper name of the i32-backed constant family
pub const INT_CONST: &str = "int_const";

/// Wrapper name of the i64-backed constant family
pub const LONG_CONST: &str = "long_const";

/// An `int_const` holding a known i32
pub fn int_const(n: i32) -> Value {
    Value::constant(INT_CONST, Value::I32(n))
}

/// A `long_const` holding a known i64
pub fn long_const(n: i64) -> Value {
    Value::constant(LONG_CONST, Value::I64(n))
}

/// Tag of the `int_const` family
pub fn int_const_tag() -> Tag {
    Tag::constant(INT_CONST, Tag::int32())
}

/// Tag of the `long_const` family
pub fn long_const_tag() -> Tag {
    Tag::constant(LONG_CONST, Tag::int64())
}
