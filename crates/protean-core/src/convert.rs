//! Cross-tag conversion with embedding classification
//!
//! Conversions are dispatched like any other algorithm, keyed by the
//! (target, source) tag pair. Each carries an embedding classification:
//! only lossless embeddings participate in automatic common-type promotion
//! for binary operators; anything else must be requested explicitly.

use crate::error::{BuildError, DispatchError, Result};
use crate::registry::{Registry, RegistryBuilder};
use crate::tag::Tag;
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Whether a conversion preserves all information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRule {
    /// Lossless; eligible for implicit promotion
    Embedding,
    /// Potentially narrowing; explicit only
    NotEmbedding,
    /// A constant-wrapper conversion: losslessness follows the payload
    /// conversion's classification
    FollowsPayload,
}

/// Signature of a conversion body; receives the target tag
pub type ConvFn =
    Arc<dyn Fn(&Registry, &Tag, &Value) -> Result<Value> + Send + Sync>;

/// Predicate over a (target, source) tag pair
pub type ConvGuard = Arc<dyn Fn(&Registry, &Tag, &Tag) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Conversion {
    pub(crate) origin: String,
    pub(crate) rule: EmbeddingRule,
    pub(crate) func: ConvFn,
}

pub(crate) struct ConversionTable {
    exact: IndexMap<(Tag, Tag), Conversion>,
    guarded: Vec<(ConvGuard, Conversion)>,
}

impl ConversionTable {
    pub(crate) fn new() -> Self {
        Self {
            exact: IndexMap::new(),
            guarded: Vec::new(),
        }
    }
}

impl RegistryBuilder {
    /// Exact conversion between two tags
    pub fn conversion(
        &mut self,
        to: Tag,
        from: Tag,
        rule: EmbeddingRule,
        origin: &str,
        func: impl Fn(&Registry, &Tag, &Value) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let table = self.conversions_mut();
        let key = (to.clone(), from.clone());
        if let Some(existing) = table.exact.get(&key) {
            return Err(BuildError::DuplicateConversion {
                to,
                from,
                existing: existing.origin.clone(),
            });
        }
        table.exact.insert(
            key,
            Conversion {
                origin: origin.to_string(),
                rule,
                func: Arc::new(func),
            },
        );
        Ok(())
    }

    /// Guarded conversion over a (target, source) tag-pair predicate
    pub fn conversion_when(
        &mut self,
        origin: &str,
        rule: EmbeddingRule,
        guard: impl Fn(&Registry, &Tag, &Tag) -> bool + Send + Sync + 'static,
        func: impl Fn(&Registry, &Tag, &Value) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) {
        self.conversions_mut().guarded.push((
            Arc::new(guard),
            Conversion {
                origin: origin.to_string(),
                rule,
                func: Arc::new(func),
            },
        ));
    }
}

impl Registry {
    fn resolve_conversion(&self, to: &Tag, from: &Tag) -> Result<&Conversion> {
        let key = (to.clone(), from.clone());
        if let Some(conversion) = self.conversions.exact.get(&key) {
            return Ok(conversion);
        }
        let mut hit: Option<&Conversion> = None;
        for (guard, conversion) in &self.conversions.guarded {
            if guard(self, to, from) {
                if let Some(existing) = hit {
                    return Err(DispatchError::AmbiguousImplementation {
                        algorithm: "to".to_string(),
                        tag: from.clone(),
                        candidates: vec![
                            existing.origin.clone(),
                            conversion.origin.clone(),
                        ],
                    });
                }
                hit = Some(conversion);
            }
        }
        hit.ok_or_else(|| DispatchError::NoConversion {
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// Whether any conversion (identity included) exists between the tags
    pub fn has_conversion(&self, to: &Tag, from: &Tag) -> bool {
        to == from || self.resolve_conversion(to, from).is_ok()
    }

    /// Convert a value into the target tag.
    ///
    /// Identity conversions are always available; everything else must be
    /// registered. Absence is a resolution failure, not a fallback.
    pub fn to(&self, target: &Tag, value: &Value) -> Result<Value> {
        let from = value.tag();
        if from == *target {
            return Ok(value.clone());
        }
        let conversion = self.resolve_conversion(target, &from)?;
        (conversion.func)(self, target, value)
    }

    /// Whether converting `from` into `to` is a lossless embedding.
    ///
    /// Identity is an embedding; wrapper conversions inherit the
    /// classification of their payload conversion.
    pub fn is_embedded(&self, from: &Tag, to: &Tag) -> bool {
        if from == to {
            return true;
        }
        let Ok(conversion) = self.resolve_conversion(to, from) else {
            return false;
        };
        match conversion.rule {
            EmbeddingRule::Embedding => true,
            EmbeddingRule::NotEmbedding => false,
            EmbeddingRule::FollowsPayload => match from.underlying() {
                Some(payload_from) => {
                    let payload_to = to.underlying().unwrap_or(to);
                    self.is_embedded(payload_from, payload_to)
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    fn registry_with_widening() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder
            .conversion(
                Tag::int64(),
                Tag::int32(),
                EmbeddingRule::Embedding,
                "i32->i64",
                |_, _, v| Ok(Value::I64(v.expect_i64("to")?)),
            )
            .unwrap();
        builder
            .conversion(
                Tag::int32(),
                Tag::int64(),
                EmbeddingRule::NotEmbedding,
                "i64->i32",
                |_, _, v| {
                    let n = v.expect_i64("to")?;
                    Ok(Value::I32(n as i32))
                },
            )
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_identity_conversion() {
        let registry = registry_with_widening();
        let out = registry.to(&Tag::int32(), &Value::I32(7)).unwrap();
        assert_eq!(out, Value::I32(7));
        assert!(registry.is_embedded(&Tag::int32(), &Tag::int32()));
    }

    #[test]
    fn test_widening_is_an_embedding() {
        let registry = registry_with_widening();
        let out = registry.to(&Tag::int64(), &Value::I32(7)).unwrap();
        assert_eq!(out, Value::I64(7));
        assert!(registry.is_embedded(&Tag::int32(), &Tag::int64()));
    }

    #[test]
    fn test_narrowing_is_explicit_only() {
        let registry = registry_with_widening();
        // Available when asked for...
        let out = registry.to(&Tag::int32(), &Value::I64(7)).unwrap();
        assert_eq!(out, Value::I32(7));
        // ...but never an embedding
        assert!(!registry.is_embedded(&Tag::int64(), &Tag::int32()));
    }

    #[test]
    fn test_missing_conversion() {
        let registry = registry_with_widening();
        let err = registry.to(&Tag::string(), &Value::I32(7)).unwrap_err();
        assert!(matches!(err, DispatchError::NoConversion { .. }));
        assert!(!registry.is_embedded(&Tag::int32(), &Tag::string()));
    }

    #[test]
    fn test_duplicate_conversion_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .conversion(
                Tag::int64(),
                Tag::int32(),
                EmbeddingRule::Embedding,
                "first",
                |_, _, v| Ok(v.clone()),
            )
            .unwrap();
        let err = builder
            .conversion(
                Tag::int64(),
                Tag::int32(),
                EmbeddingRule::Embedding,
                "second",
                |_, _, v| Ok(v.clone()),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateConversion { .. }));
    }
}
