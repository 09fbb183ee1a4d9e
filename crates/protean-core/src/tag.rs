//! Tag assignment
//!
//! A tag is the compile-time identity a family of concrete values dispatches
//! under. Every value maps to exactly one tag; several payload shapes may
//! share a tag. Tags are immutable plain data, assigned when a collaborator
//! is authored and never changed afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrapper name of the canonical constant representation.
///
/// When two *different* constant-wrapper families meet in common-type
/// resolution, the result falls back to this wrapper so neither family's
/// representation silently wins.
pub const CANONICAL_WRAPPER: &str = "canonical";

/// Dispatch identity of a value family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// A library- or user-declared tag family (e.g. a container family)
    Named(String),

    /// Structural fallback: a plain type dispatching as its own identity
    Foreign(String),

    /// A constant-wrapper tag: a wrapper family applied to an underlying tag
    Constant { wrapper: String, underlying: Box<Tag> },
}

impl Tag {
    /// Tag for a declared family
    pub fn named(name: impl Into<String>) -> Self {
        Tag::Named(name.into())
    }

    /// Tag for a plain type dispatching as itself
    pub fn foreign(name: impl Into<String>) -> Self {
        Tag::Foreign(name.into())
    }

    /// Constant-wrapper tag over an underlying tag
    pub fn constant(wrapper: impl Into<String>, underlying: Tag) -> Self {
        Tag::Constant {
            wrapper: wrapper.into(),
            underlying: Box::new(underlying),
        }
    }

    /// Canonical constant wrapper over an underlying tag
    pub fn canonical(underlying: Tag) -> Self {
        Tag::constant(CANONICAL_WRAPPER, underlying)
    }

    pub fn boolean() -> Self {
        Tag::Foreign("bool".to_string())
    }

    pub fn int32() -> Self {
        Tag::Foreign("i32".to_string())
    }

    pub fn int64() -> Self {
        Tag::Foreign("i64".to_string())
    }

    pub fn float64() -> Self {
        Tag::Foreign("f64".to_string())
    }

    pub fn string() -> Self {
        Tag::Foreign("str".to_string())
    }

    pub fn unit() -> Self {
        Tag::Foreign("unit".to_string())
    }

    pub fn function() -> Self {
        Tag::Foreign("fn".to_string())
    }

    /// Internal carrier tag for raw element lists built by derivations
    pub fn list() -> Self {
        Tag::Foreign("list".to_string())
    }

    /// Whether this tag is a constant-wrapper tag
    pub fn is_constant(&self) -> bool {
        matches!(self, Tag::Constant { .. })
    }

    /// Wrapper name, if this is a constant-wrapper tag
    pub fn wrapper(&self) -> Option<&str> {
        match self {
            Tag::Constant { wrapper, .. } => Some(wrapper),
            _ => None,
        }
    }

    /// Underlying tag, if this is a constant-wrapper tag
    pub fn underlying(&self) -> Option<&Tag> {
        match self {
            Tag::Constant { underlying, .. } => Some(underlying),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Named(name) => write!(f, "{}", name),
            Tag::Foreign(name) => write!(f, "{}", name),
            Tag::Constant { wrapper, underlying } => {
                write!(f, "{}<{}>", wrapper, underlying)
            }
        }
    }
}
