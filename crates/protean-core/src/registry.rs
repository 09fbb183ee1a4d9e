//! Implementation records and dispatch resolution
//!
//! The registry is the rendering of compile-time specialization tables as an
//! explicit data structure: per algorithm it holds exact-tag entries, guarded
//! entries (the analog of conditionally enabled specializations), derived
//! entries installed by minimal-complete-definition derivation, and at most
//! one generic default. It is populated through `RegistryBuilder`, finalized
//! once, and never mutated afterwards; concurrent reads need no locking.
//!
//! Resolution selects exactly one record per call. Within a guarded level,
//! two matching entries are an ambiguity error rather than a silent pick.

use crate::concept::ConceptDef;
use crate::convert::ConversionTable;
use crate::error::{BuildError, DispatchError, Result};
use crate::tag::Tag;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::Arc;
use tracing::debug;

/// How an algorithm selects its dispatch tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispatch {
    /// Dispatch on the first argument's tag (fold, transform, length, ...)
    Unary,
    /// Dispatch on the pair of both argument tags (equal, less, plus, ...)
    Binary,
    /// Dispatch on an explicitly supplied tag (zero, one, rebuild, ...)
    ByTag,
}

/// Argument count contract for an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn check(&self, algorithm: &str, got: usize) -> Result<()> {
        let ok = match self {
            Arity::Exact(n) => got == *n,
            Arity::AtLeast(n) => got >= *n,
        };
        if ok {
            Ok(())
        } else {
            Err(DispatchError::Arity {
                algorithm: algorithm.to_string(),
                expected: match self {
                    Arity::Exact(n) => n.to_string(),
                    Arity::AtLeast(n) => format!("at least {}", n),
                },
                got,
            })
        }
    }
}

/// Where a selected implementation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Authored directly for the tag (exact or guarded)
    Concrete,
    /// Installed by minimal-complete-definition derivation
    Derived,
    /// The generic catch-all
    Default,
}

/// Signature of a registered implementation. The second parameter is the
/// dispatch tag the call resolved on (the only channel a nullary or
/// by-tag implementation has to learn its target family).
pub type ImplFn =
    Arc<dyn Fn(&Registry, &Tag, &[Value]) -> Result<Value> + Send + Sync>;

/// Predicate over a single dispatch tag
pub type TagPredicate = Arc<dyn Fn(&Registry, &Tag) -> bool + Send + Sync>;

/// Predicate over a pair of dispatch tags
pub type PairPredicate =
    Arc<dyn Fn(&Registry, &Tag, &Tag) -> bool + Send + Sync>;

/// Condition attached to a guarded implementation record
#[derive(Clone)]
pub enum Guard {
    Tag(TagPredicate),
    Pair(PairPredicate),
}

impl Guard {
    fn matches(&self, registry: &Registry, a: &Tag, b: Option<&Tag>) -> bool {
        match (self, b) {
            (Guard::Tag(pred), None) => pred(registry, a),
            // Unary guards also apply to homogeneous pairs
            (Guard::Tag(pred), Some(b)) => a == b && pred(registry, a),
            (Guard::Pair(pred), Some(b)) => pred(registry, a, b),
            (Guard::Pair(_), None) => false,
        }
    }
}

/// A selected implementation
#[derive(Clone)]
pub struct ImplRecord {
    pub provenance: Provenance,
    /// Diagnostic label, e.g. `vec_seq::fold`
    pub origin: String,
    pub func: ImplFn,
}

struct GuardedImpl {
    guard: Guard,
    record: ImplRecord,
}

/// Serializable description of a resolution outcome, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionInfo {
    pub algorithm: String,
    pub tag: Tag,
    pub provenance: Provenance,
    pub origin: String,
}

pub(crate) struct AlgorithmEntry {
    dispatch: Dispatch,
    arity: Arity,
    exact_unary: IndexMap<Tag, ImplRecord>,
    exact_pair: IndexMap<(Tag, Tag), ImplRecord>,
    guarded: Vec<GuardedImpl>,
    derived: Vec<GuardedImpl>,
    default: Option<ImplRecord>,
}

impl AlgorithmEntry {
    fn new(dispatch: Dispatch, arity: Arity) -> Self {
        Self {
            dispatch,
            arity,
            exact_unary: IndexMap::new(),
            exact_pair: IndexMap::new(),
            guarded: Vec::new(),
            derived: Vec::new(),
            default: None,
        }
    }
}

// Backstop against cyclic guards: resolution is re-entrant (guards query
// `models`, derivations call back into the registry), so a mis-authored
// guard cycle would otherwise hang instead of erroring.
const RECURSION_LIMIT: usize = 200;

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
}

struct DepthGuard;

impl DepthGuard {
    fn enter(algorithm: &str) -> Result<DepthGuard> {
        let depth = DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });
        if depth > RECURSION_LIMIT {
            Err(DispatchError::RecursionLimit {
                algorithm: algorithm.to_string(),
            })
        } else {
            Ok(DepthGuard)
        }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// The finalized, immutable dispatch table
pub struct Registry {
    pub(crate) algorithms: IndexMap<String, AlgorithmEntry>,
    pub(crate) concepts: IndexMap<String, ConceptDef>,
    pub(crate) commons: IndexMap<(Tag, Tag), Tag>,
    pub(crate) conversions: ConversionTable,
}

impl Registry {
    pub(crate) fn entry(&self, algorithm: &str) -> Result<&AlgorithmEntry> {
        self.algorithms
            .get(algorithm)
            .ok_or_else(|| DispatchError::UnknownAlgorithm(algorithm.to_string()))
    }

    /// Registered algorithm names, in registration order
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }

    /// Registered concept definitions, in registration order
    pub fn concepts(&self) -> impl Iterator<Item = &ConceptDef> {
        self.concepts.values()
    }

    fn select_guarded<'a>(
        &self,
        list: &'a [GuardedImpl],
        algorithm: &str,
        a: &Tag,
        b: Option<&Tag>,
    ) -> Result<Option<&'a ImplRecord>> {
        let mut hit: Option<&GuardedImpl> = None;
        for candidate in list {
            if candidate.guard.matches(self, a, b) {
                if let Some(existing) = hit {
                    return Err(DispatchError::AmbiguousImplementation {
                        algorithm: algorithm.to_string(),
                        tag: a.clone(),
                        candidates: vec![
                            existing.record.origin.clone(),
                            candidate.record.origin.clone(),
                        ],
                    });
                }
                hit = Some(candidate);
            }
        }
        Ok(hit.map(|g| &g.record))
    }

    /// Resolve a unary or by-tag dispatch: most specific record wins.
    pub(crate) fn resolve_unary(
        &self,
        algorithm: &str,
        tag: &Tag,
    ) -> Result<&ImplRecord> {
        let _depth = DepthGuard::enter(algorithm)?;
        let entry = self.entry(algorithm)?;
        if let Some(record) = entry.exact_unary.get(tag) {
            return Ok(record);
        }
        if let Some(record) =
            self.select_guarded(&entry.guarded, algorithm, tag, None)?
        {
            return Ok(record);
        }
        if let Some(record) =
            self.select_guarded(&entry.derived, algorithm, tag, None)?
        {
            return Ok(record);
        }
        if let Some(record) = &entry.default {
            return Ok(record);
        }
        Err(DispatchError::NoModel {
            algorithm: algorithm.to_string(),
            tag: tag.clone(),
        })
    }

    /// Resolve a homogeneous binary dispatch (both tags equal)
    pub(crate) fn resolve_pair(
        &self,
        algorithm: &str,
        a: &Tag,
        b: &Tag,
    ) -> Result<&ImplRecord> {
        let _depth = DepthGuard::enter(algorithm)?;
        let entry = self.entry(algorithm)?;
        let key = (a.clone(), b.clone());
        if let Some(record) = entry.exact_pair.get(&key) {
            return Ok(record);
        }
        if let Some(record) =
            self.select_guarded(&entry.guarded, algorithm, a, Some(b))?
        {
            return Ok(record);
        }
        if let Some(record) =
            self.select_guarded(&entry.derived, algorithm, a, Some(b))?
        {
            return Ok(record);
        }
        if let Some(record) = &entry.default {
            return Ok(record);
        }
        Err(DispatchError::NoModel {
            algorithm: algorithm.to_string(),
            tag: a.clone(),
        })
    }

    /// Cross-type direct lookup: exact pair or matching pair guard only.
    /// Derived records and defaults carry homogeneous semantics and are
    /// reached through the common-type conversion path instead.
    fn resolve_cross_direct(
        &self,
        algorithm: &str,
        a: &Tag,
        b: &Tag,
    ) -> Result<Option<&ImplRecord>> {
        let entry = self.entry(algorithm)?;
        let key = (a.clone(), b.clone());
        if let Some(record) = entry.exact_pair.get(&key) {
            return Ok(Some(record));
        }
        self.select_guarded(&entry.guarded, algorithm, a, Some(b))
    }

    /// Whether the algorithm resolves at the concrete level (exact or
    /// guarded concrete) for this tag. Used by strategy detection so that
    /// derivation bridges never observe other derived records.
    pub fn resolves_concretely(&self, algorithm: &str, tag: &Tag) -> bool {
        let Ok(entry) = self.entry(algorithm) else {
            return false;
        };
        let direct = match entry.dispatch {
            Dispatch::Binary => entry
                .exact_pair
                .contains_key(&(tag.clone(), tag.clone())),
            _ => entry.exact_unary.contains_key(tag),
        };
        if direct {
            return true;
        }
        let pair = matches!(entry.dispatch, Dispatch::Binary);
        let b = if pair { Some(tag) } else { None };
        matches!(
            self.select_guarded(&entry.guarded, algorithm, tag, b),
            Ok(Some(_))
        )
    }

    /// Whether the algorithm resolves with non-default provenance for this
    /// tag (concretely authored or MCD-derived). This is the evidence
    /// `models` counts.
    pub(crate) fn resolves_nondefault(&self, algorithm: &str, tag: &Tag) -> bool {
        let Ok(entry) = self.entry(algorithm) else {
            return false;
        };
        let resolved = match entry.dispatch {
            Dispatch::Binary => self.resolve_pair(algorithm, tag, tag),
            _ => self.resolve_unary(algorithm, tag),
        };
        match resolved {
            Ok(record) => record.provenance != Provenance::Default,
            Err(_) => false,
        }
    }

    /// Describe how a call on this tag would resolve, without invoking it
    pub fn implementation(
        &self,
        algorithm: &str,
        tag: &Tag,
    ) -> Result<ResolutionInfo> {
        let entry = self.entry(algorithm)?;
        let record = match entry.dispatch {
            Dispatch::Binary => self.resolve_pair(algorithm, tag, tag)?,
            _ => self.resolve_unary(algorithm, tag)?,
        };
        Ok(ResolutionInfo {
            algorithm: algorithm.to_string(),
            tag: tag.clone(),
            provenance: record.provenance,
            origin: record.origin.clone(),
        })
    }

    /// Invoke an algorithm, dispatching on its arguments' tags.
    ///
    /// Binary algorithms whose argument tags differ follow the cross-type
    /// path: a direct pair override if one exists, otherwise conversion of
    /// both operands into their common tag (embeddings only), otherwise
    /// `NoCommonType`.
    pub fn call(&self, algorithm: &str, args: &[Value]) -> Result<Value> {
        let _depth = DepthGuard::enter(algorithm)?;
        let entry = self.entry(algorithm)?;
        entry.arity.check(algorithm, args.len())?;
        match entry.dispatch {
            Dispatch::Unary => {
                if args.is_empty() {
                    return Err(DispatchError::Arity {
                        algorithm: algorithm.to_string(),
                        expected: "at least 1".to_string(),
                        got: 0,
                    });
                }
                let tag = args[0].tag();
                let record = self.resolve_unary(algorithm, &tag)?;
                debug!(algorithm, tag = %tag, origin = %record.origin, "dispatch");
                (record.func)(self, &tag, args)
            }
            Dispatch::Binary => {
                if args.len() < 2 {
                    return Err(DispatchError::Arity {
                        algorithm: algorithm.to_string(),
                        expected: "2".to_string(),
                        got: args.len(),
                    });
                }
                let a = args[0].tag();
                let b = args[1].tag();
                if a == b {
                    let record = self.resolve_pair(algorithm, &a, &b)?;
                    debug!(algorithm, tag = %a, origin = %record.origin, "dispatch");
                    return (record.func)(self, &a, args);
                }
                if let Some(record) =
                    self.resolve_cross_direct(algorithm, &a, &b)?
                {
                    debug!(
                        algorithm, lhs = %a, rhs = %b,
                        origin = %record.origin, "cross-type dispatch"
                    );
                    return (record.func)(self, &a, args);
                }
                let common = self.common(&a, &b)?;
                if !self.is_embedded(&a, &common) || !self.is_embedded(&b, &common)
                {
                    // A common tag exists but reaching it would lose
                    // information; only embeddings promote implicitly.
                    return Err(DispatchError::NoCommonType { lhs: a, rhs: b });
                }
                debug!(
                    algorithm, lhs = %a, rhs = %b, common = %common,
                    "cross-type dispatch via common tag"
                );
                let x = self.to(&common, &args[0])?;
                let y = self.to(&common, &args[1])?;
                self.call(algorithm, &[x, y])
            }
            Dispatch::ByTag => Err(DispatchError::Arity {
                algorithm: algorithm.to_string(),
                expected: "an explicit dispatch tag (use invoke_on)".to_string(),
                got: args.len(),
            }),
        }
    }

    /// Invoke an algorithm on an explicitly chosen dispatch tag.
    ///
    /// This is the entry point for by-tag algorithms (`zero`, `rebuild`)
    /// and for derivations that already know the target family.
    pub fn invoke_on(
        &self,
        algorithm: &str,
        tag: &Tag,
        args: &[Value],
    ) -> Result<Value> {
        let _depth = DepthGuard::enter(algorithm)?;
        let entry = self.entry(algorithm)?;
        entry.arity.check(algorithm, args.len())?;
        let record = match entry.dispatch {
            Dispatch::Binary => self.resolve_pair(algorithm, tag, tag)?,
            _ => self.resolve_unary(algorithm, tag)?,
        };
        debug!(algorithm, tag = %tag, origin = %record.origin, "by-tag dispatch");
        (record.func)(self, tag, args)
    }

    /// Invoke a nullary by-tag algorithm (`zero`, `one`)
    pub fn nullary(&self, algorithm: &str, tag: &Tag) -> Result<Value> {
        self.invoke_on(algorithm, tag, &[])
    }
}

/// Mutable construction side of the registry.
///
/// All mutation lives here; `finalize` validates the concept graph and
/// produces the immutable `Registry`.
pub struct RegistryBuilder {
    algorithms: IndexMap<String, AlgorithmEntry>,
    concepts: IndexMap<String, ConceptDef>,
    commons: IndexMap<(Tag, Tag), Tag>,
    conversions: ConversionTable,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            algorithms: IndexMap::new(),
            concepts: IndexMap::new(),
            commons: IndexMap::new(),
            conversions: ConversionTable::new(),
        }
    }

    /// Register an algorithm name with its dispatch mode and arity
    pub fn algorithm(
        &mut self,
        name: &str,
        dispatch: Dispatch,
        arity: Arity,
    ) -> std::result::Result<(), BuildError> {
        if self.algorithms.contains_key(name) {
            return Err(BuildError::DuplicateAlgorithm(name.to_string()));
        }
        self.algorithms
            .insert(name.to_string(), AlgorithmEntry::new(dispatch, arity));
        Ok(())
    }

    fn entry_mut(
        &mut self,
        algorithm: &str,
        origin: &str,
    ) -> std::result::Result<&mut AlgorithmEntry, BuildError> {
        self.algorithms.get_mut(algorithm).ok_or_else(|| {
            BuildError::ImplForUnknownAlgorithm {
                algorithm: algorithm.to_string(),
                origin: origin.to_string(),
            }
        })
    }

    /// Exact concrete implementation for one tag
    pub fn implement(
        &mut self,
        algorithm: &str,
        tag: Tag,
        origin: &str,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let record = ImplRecord {
            provenance: Provenance::Concrete,
            origin: origin.to_string(),
            func: Arc::new(func),
        };
        let name = algorithm.to_string();
        let entry = self.entry_mut(algorithm, origin)?;
        if let Some(existing) = entry.exact_unary.get(&tag) {
            return Err(BuildError::DuplicateImpl {
                algorithm: name,
                tag,
                existing: existing.origin.clone(),
            });
        }
        entry.exact_unary.insert(tag, record);
        Ok(())
    }

    /// Exact concrete implementation for one tag pair
    pub fn implement_pair(
        &mut self,
        algorithm: &str,
        tags: (Tag, Tag),
        origin: &str,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let record = ImplRecord {
            provenance: Provenance::Concrete,
            origin: origin.to_string(),
            func: Arc::new(func),
        };
        let name = algorithm.to_string();
        let entry = self.entry_mut(algorithm, origin)?;
        if let Some(existing) = entry.exact_pair.get(&tags) {
            return Err(BuildError::DuplicateImpl {
                algorithm: name,
                tag: tags.0,
                existing: existing.origin.clone(),
            });
        }
        entry.exact_pair.insert(tags, record);
        Ok(())
    }

    /// Guarded concrete implementation (conditionally enabled)
    pub fn implement_when(
        &mut self,
        algorithm: &str,
        origin: &str,
        guard: impl Fn(&Registry, &Tag) -> bool + Send + Sync + 'static,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let guarded = GuardedImpl {
            guard: Guard::Tag(Arc::new(guard)),
            record: ImplRecord {
                provenance: Provenance::Concrete,
                origin: origin.to_string(),
                func: Arc::new(func),
            },
        };
        self.entry_mut(algorithm, origin)?.guarded.push(guarded);
        Ok(())
    }

    /// Guarded concrete implementation over a tag pair
    pub fn implement_when_pair(
        &mut self,
        algorithm: &str,
        origin: &str,
        guard: impl Fn(&Registry, &Tag, &Tag) -> bool + Send + Sync + 'static,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let guarded = GuardedImpl {
            guard: Guard::Pair(Arc::new(guard)),
            record: ImplRecord {
                provenance: Provenance::Concrete,
                origin: origin.to_string(),
                func: Arc::new(func),
            },
        };
        self.entry_mut(algorithm, origin)?.guarded.push(guarded);
        Ok(())
    }

    /// Guarded derived implementation (installed by MCD derivation)
    pub fn derive_when(
        &mut self,
        algorithm: &str,
        origin: &str,
        guard: impl Fn(&Registry, &Tag) -> bool + Send + Sync + 'static,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let guarded = GuardedImpl {
            guard: Guard::Tag(Arc::new(guard)),
            record: ImplRecord {
                provenance: Provenance::Derived,
                origin: origin.to_string(),
                func: Arc::new(func),
            },
        };
        self.entry_mut(algorithm, origin)?.derived.push(guarded);
        Ok(())
    }

    /// Guarded derived implementation over a tag pair
    pub fn derive_when_pair(
        &mut self,
        algorithm: &str,
        origin: &str,
        guard: impl Fn(&Registry, &Tag, &Tag) -> bool + Send + Sync + 'static,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let guarded = GuardedImpl {
            guard: Guard::Pair(Arc::new(guard)),
            record: ImplRecord {
                provenance: Provenance::Derived,
                origin: origin.to_string(),
                func: Arc::new(func),
            },
        };
        self.entry_mut(algorithm, origin)?.derived.push(guarded);
        Ok(())
    }

    /// The single generic catch-all for an algorithm
    pub fn default_impl(
        &mut self,
        algorithm: &str,
        origin: &str,
        func: impl Fn(&Registry, &Tag, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    ) -> std::result::Result<(), BuildError> {
        let name = algorithm.to_string();
        let entry = self.entry_mut(algorithm, origin)?;
        if let Some(existing) = &entry.default {
            return Err(BuildError::DefaultAlreadySet {
                algorithm: name,
                existing: existing.origin.clone(),
            });
        }
        entry.default = Some(ImplRecord {
            provenance: Provenance::Default,
            origin: origin.to_string(),
            func: Arc::new(func),
        });
        Ok(())
    }

    /// Register a concept definition
    pub fn concept(
        &mut self,
        def: ConceptDef,
    ) -> std::result::Result<(), BuildError> {
        if self.concepts.contains_key(def.name()) {
            return Err(BuildError::DuplicateConcept(def.name().to_string()));
        }
        self.concepts.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Declare a common tag for a pair; stored symmetrically
    pub fn declare_common(
        &mut self,
        a: Tag,
        b: Tag,
        common: Tag,
    ) -> std::result::Result<(), BuildError> {
        for key in [(a.clone(), b.clone()), (b.clone(), a.clone())] {
            if let Some(existing) = self.commons.get(&key) {
                if *existing != common {
                    return Err(BuildError::ConflictingCommon {
                        lhs: key.0,
                        rhs: key.1,
                        existing: existing.clone(),
                        conflicting: common,
                    });
                }
            }
        }
        self.commons.insert((a.clone(), b.clone()), common.clone());
        self.commons.insert((b, a), common);
        Ok(())
    }

    pub(crate) fn conversions_mut(&mut self) -> &mut ConversionTable {
        &mut self.conversions
    }

    pub(crate) fn concepts_ref(&self) -> &IndexMap<String, ConceptDef> {
        &self.concepts
    }

    pub(crate) fn has_algorithm(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    /// Validate the concept graph and freeze the registry.
    pub fn finalize(self) -> std::result::Result<Registry, BuildError> {
        crate::concept::validate(&self)?;
        debug!(
            algorithms = self.algorithms.len(),
            concepts = self.concepts.len(),
            "registry finalized"
        );
        Ok(Registry {
            algorithms: self.algorithms,
            concepts: self.concepts,
            commons: self.commons,
            conversions: self.conversions,
        })
    }
}
