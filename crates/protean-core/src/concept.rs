//! Concepts and minimal complete definitions
//!
//! A concept names a capability: one or more alternative minimal primitive
//! sets (MCD strategies), any of which suffices for a tag to model the
//! concept, plus derived operations installed against the registry as
//! guarded records. `models` is the compile-time predicate rendered as a
//! query: it never errors for a known concept, it only answers.

use crate::error::{BuildError, DispatchError, Result};
use crate::registry::{Registry, RegistryBuilder};
use crate::tag::Tag;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One alternative minimal primitive set for a concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McdStrategy {
    name: String,
    primitives: Vec<String>,
}

impl McdStrategy {
    pub fn new(name: &str, primitives: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            primitives: primitives.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitives(&self) -> &[String] {
        &self.primitives
    }
}

/// A named capability contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDef {
    name: String,
    refines: Vec<String>,
    strategies: Vec<McdStrategy>,
}

impl ConceptDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            refines: Vec::new(),
            strategies: Vec::new(),
        }
    }

    /// Declare a refinement edge: modeling this concept presupposes the
    /// laws of the refined one. Checked for acyclicity at finalize; the
    /// laws themselves are a testing convention, not engine-enforced.
    pub fn refines(mut self, concept: &str) -> Self {
        self.refines.push(concept.to_string());
        self
    }

    /// Add an alternative minimal primitive set
    pub fn strategy(mut self, name: &str, primitives: &[&str]) -> Self {
        self.strategies.push(McdStrategy::new(name, primitives));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn refined(&self) -> &[String] {
        &self.refines
    }

    pub fn strategies(&self) -> &[McdStrategy] {
        &self.strategies
    }
}

impl Registry {
    /// Whether the tag models the concept: some strategy has every
    /// primitive resolving with non-default provenance. Derived records
    /// count as evidence, mirroring "not the generic catch-all".
    pub fn models(&self, concept: &str, tag: &Tag) -> Result<bool> {
        let def = self
            .concepts
            .get(concept)
            .ok_or_else(|| DispatchError::UnknownConcept(concept.to_string()))?;
        Ok(def.strategies.iter().any(|strategy| {
            strategy
                .primitives
                .iter()
                .all(|p| self.resolves_nondefault(p, tag))
        }))
    }

    /// Whether every primitive of one named strategy resolves at the
    /// strictly concrete level. Derivation bridges are guarded with this
    /// so that two strategies bridging to each other can never recurse.
    pub fn strategy_concrete(
        &self,
        concept: &str,
        strategy: &str,
        tag: &Tag,
    ) -> bool {
        let Some(def) = self.concepts.get(concept) else {
            return false;
        };
        def.strategies
            .iter()
            .find(|s| s.name == strategy)
            .map(|s| {
                !s.primitives.is_empty()
                    && s.primitives
                        .iter()
                        .all(|p| self.resolves_concretely(p, tag))
            })
            .unwrap_or(false)
    }

    /// Whether any strategy of the concept is fully concrete for the tag
    pub fn any_strategy_concrete(&self, concept: &str, tag: &Tag) -> bool {
        let Some(def) = self.concepts.get(concept) else {
            return false;
        };
        def.strategies.iter().any(|s| {
            !s.primitives.is_empty()
                && s.primitives
                    .iter()
                    .all(|p| self.resolves_concretely(p, tag))
        })
    }
}

/// Concept-graph validation run by `RegistryBuilder::finalize`
pub(crate) fn validate(builder: &RegistryBuilder) -> std::result::Result<(), BuildError> {
    let concepts = builder.concepts_ref();

    for def in concepts.values() {
        if def.strategies.iter().all(|s| s.primitives.is_empty()) {
            return Err(BuildError::TrivialConcept(def.name.clone()));
        }
        for strategy in &def.strategies {
            for primitive in &strategy.primitives {
                if !builder.has_algorithm(primitive) {
                    return Err(BuildError::UnknownPrimitive {
                        concept: def.name.clone(),
                        strategy: strategy.name.clone(),
                        primitive: primitive.clone(),
                    });
                }
            }
        }
        for refined in &def.refines {
            if !concepts.contains_key(refined) {
                return Err(BuildError::UnknownRefinement {
                    concept: def.name.clone(),
                    refined: refined.clone(),
                });
            }
        }
    }

    // Refinement edges must not cycle
    let mut graph = DiGraph::<&str, ()>::new();
    let mut nodes = HashMap::new();
    for name in concepts.keys() {
        nodes.insert(name.as_str(), graph.add_node(name.as_str()));
    }
    for def in concepts.values() {
        for refined in &def.refines {
            graph.add_edge(nodes[def.name.as_str()], nodes[refined.as_str()], ());
        }
    }
    match toposort(&graph, None) {
        Ok(order) => {
            let names: Vec<&str> = order.iter().map(|n| graph[*n]).collect();
            debug!(?names, "concept refinement order");
            Ok(())
        }
        Err(cycle) => Err(BuildError::ConceptCycle(
            graph[cycle.node_id()].to_string(),
        )),
    }
}
