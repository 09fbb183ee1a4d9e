//! Protean core - tag-dispatch algorithm resolution engine
//!
//! This crate implements:
//! - Tag assignment (a value family's dispatch identity)
//! - An immutable implementation registry with specificity-ordered
//!   resolution (exact > guarded > derived > default)
//! - Concept definitions with minimal-complete-definition strategies and
//!   the `models` predicate
//! - Common-type resolution and embedding-classified conversions
//! - The Constant/value duality bridge

pub mod common;
pub mod concept;
pub mod constant;
pub mod convert;
pub mod error;
pub mod functional;
pub mod registry;
pub mod tag;
pub mod value;

pub use concept::{ConceptDef, McdStrategy};
pub use constant::CONSTANT;
pub use convert::EmbeddingRule;
pub use error::{BuildError, DispatchError, Result};
pub use registry::{
    Arity, Dispatch, Provenance, Registry, RegistryBuilder, ResolutionInfo,
};
pub use tag::{Tag, CANONICAL_WRAPPER};
pub use value::{FnValue, Value};
