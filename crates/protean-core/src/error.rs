//! Error types for dispatch resolution and registry construction

use crate::tag::Tag;
use thiserror::Error;

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced by the resolution phase.
///
/// None of these are recovered downstream: they are produced while an
/// implementation is being selected, before the operation itself runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The tag does not implement the algorithm, directly or by derivation
    #[error("no model: algorithm `{algorithm}` is not implemented for tag `{tag}`")]
    NoModel { algorithm: String, tag: Tag },

    /// A heterogeneous binary operation found no common tag for its operands
    #[error("no common type between `{lhs}` and `{rhs}`")]
    NoCommonType { lhs: Tag, rhs: Tag },

    /// A constant-only operation was invoked on a non-constant tag
    #[error("tag `{tag}` is not a Constant")]
    NotAConstant { tag: Tag },

    /// Two equally specific implementations match the same dispatch tag
    #[error("ambiguous implementation of `{algorithm}` for tag `{tag}`: {}", candidates.join(", "))]
    AmbiguousImplementation {
        algorithm: String,
        tag: Tag,
        candidates: Vec<String>,
    },

    /// No conversion is registered from one tag to another
    #[error("no conversion from `{from}` to `{to}`")]
    NoConversion { from: Tag, to: Tag },

    /// The algorithm name is not registered
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// The concept name is not registered
    #[error("unknown concept `{0}`")]
    UnknownConcept(String),

    /// Wrong number of arguments for an algorithm
    #[error("algorithm `{algorithm}` expects {expected} argument(s), got {got}")]
    Arity {
        algorithm: String,
        expected: String,
        got: usize,
    },

    /// An implementation received a payload of the wrong kind
    #[error("algorithm `{algorithm}` expected {expected}, found `{found}`")]
    Payload {
        algorithm: String,
        expected: String,
        found: String,
    },

    /// A value in function position is not callable
    #[error("value of tag `{tag}` is not callable")]
    NotCallable { tag: Tag },

    /// A homogeneous container operation produced elements of differing tags
    #[error("algorithm `{algorithm}` produced mixed element tags: expected `{expected}`, found `{found}`")]
    NonUniformElements {
        algorithm: String,
        expected: Tag,
        found: Tag,
    },

    /// An operation requiring at least one element was applied to an empty sequence
    #[error("algorithm `{algorithm}` is undefined for an empty sequence")]
    EmptySequence { algorithm: String },

    /// Guard or derivation recursion exceeded the safety limit
    #[error("resolution of `{algorithm}` exceeded the recursion limit (cyclic guards?)")]
    RecursionLimit { algorithm: String },
}

/// Errors raised while populating or finalizing the registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// An exact implementation for this (algorithm, tag) already exists
    #[error("duplicate implementation of `{algorithm}` for tag `{tag}` (existing: {existing})")]
    DuplicateImpl {
        algorithm: String,
        tag: Tag,
        existing: String,
    },

    /// The algorithm name was registered twice
    #[error("algorithm `{0}` is already registered")]
    DuplicateAlgorithm(String),

    /// The concept name was registered twice
    #[error("concept `{0}` is already registered")]
    DuplicateConcept(String),

    /// Every strategy of the concept is empty; vacuous modeling is rejected
    #[error("concept `{0}` has no non-empty minimal definition strategy")]
    TrivialConcept(String),

    /// Concept refinement edges form a cycle
    #[error("concept refinement cycle involving `{0}`")]
    ConceptCycle(String),

    /// A strategy names a primitive that is not a registered algorithm
    #[error("concept `{concept}` strategy `{strategy}` names unknown primitive `{primitive}`")]
    UnknownPrimitive {
        concept: String,
        strategy: String,
        primitive: String,
    },

    /// A concept refines a concept that is not registered
    #[error("concept `{concept}` refines unknown concept `{refined}`")]
    UnknownRefinement { concept: String, refined: String },

    /// A generic default for this algorithm already exists
    #[error("default implementation of `{algorithm}` already set (existing: {existing})")]
    DefaultAlreadySet { algorithm: String, existing: String },

    /// A common-type declaration conflicts with an earlier one
    #[error("conflicting common type for (`{lhs}`, `{rhs}`): `{existing}` vs `{conflicting}`")]
    ConflictingCommon {
        lhs: Tag,
        rhs: Tag,
        existing: Tag,
        conflicting: Tag,
    },

    /// A conversion for this (to, from) pair already exists
    #[error("duplicate conversion from `{from}` to `{to}` (existing: {existing})")]
    DuplicateConversion {
        to: Tag,
        from: Tag,
        existing: String,
    },

    /// An implementation references an algorithm that is not registered
    #[error("implementation `{origin}` targets unknown algorithm `{algorithm}`")]
    ImplForUnknownAlgorithm { algorithm: String, origin: String },
}
