//! Plain scalar tags: common types and conversions
//!
//! The scalar models themselves (equality, ordering, arithmetic) live with
//! their concepts; this module declares how the scalar tags relate to each
//! other: which pairs share a common tag, and which conversions between
//! them are lossless embeddings eligible for implicit promotion.
//!
//! `i32 -> i64` and `i32 -> f64` are embeddings. `i64 -> f64` exists but
//! loses precision above 2^53, so it never promotes implicitly; the same
//! goes for the narrowing `i64 -> i32`.

use protean_core::{
    BuildError, EmbeddingRule, RegistryBuilder, Tag, Value,
};

pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    builder.declare_common(Tag::int32(), Tag::int64(), Tag::int64())?;
    builder.declare_common(Tag::int32(), Tag::float64(), Tag::float64())?;
    builder.declare_common(Tag::int64(), Tag::float64(), Tag::float64())?;

    builder.conversion(
        Tag::int64(),
        Tag::int32(),
        EmbeddingRule::Embedding,
        "foreign::i32_to_i64",
        |_, _, v| Ok(Value::I64(v.expect_i64("to")?)),
    )?;

    builder.conversion(
        Tag::int32(),
        Tag::int64(),
        EmbeddingRule::NotEmbedding,
        "foreign::i64_to_i32",
        |_, _, v| Ok(Value::I32(v.expect_i64("to")? as i32)),
    )?;

    builder.conversion(
        Tag::float64(),
        Tag::int32(),
        EmbeddingRule::Embedding,
        "foreign::i32_to_f64",
        |_, _, v| Ok(Value::F64(v.expect_i64("to")? as f64)),
    )?;

    builder.conversion(
        Tag::float64(),
        Tag::int64(),
        EmbeddingRule::NotEmbedding,
        "foreign::i64_to_f64",
        |_, _, v| Ok(Value::F64(v.expect_i64("to")? as f64)),
    )?;

    Ok(())
}
