//! Graph construction from signed triples.
//!
//! # Overview
//!
//! A [`SignedGraph`] is built one link at a time. Each link is an ordered
//! `(source, target)` pair with a sign of `+1` ([`Influence::Increases`]) or
//! `-1` ([`Influence::Decreases`]).
//!
//! ## Edge Rules
//!
//! - At most one link exists per ordered pair. Adding the same pair again
//!   replaces the stored sign (last write wins).
//! - A sign other than `±1` is rejected before anything is registered, so a
//!   bad triple never creates a dangling concept.
//! - Self-links (`source == target`) are valid and form size-1 loops.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::model::{ConceptId, Influence, Triple};
use crate::registry::ConceptRegistry;

// ---------------------------------------------------------------------------
// SignedGraph
// ---------------------------------------------------------------------------

/// A directed graph of concepts joined by signed links.
///
/// Nodes are [`ConceptId`]s issued by the graph's own [`ConceptRegistry`].
/// An edge `A → B` weighted [`Influence::Decreases`] means "more A causes
/// less B".
#[derive(Debug, Clone, Default)]
pub struct SignedGraph {
    pub(crate) registry: ConceptRegistry,
    pub(crate) graph: StableDiGraph<ConceptId, Influence>,
    /// Concepts currently present as nodes. Pruned concepts stay in the
    /// registry but leave this map.
    pub(crate) node_map: HashMap<ConceptId, NodeIndex>,
}

/// What [`SignedGraph::add_link`] did with a valid link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// The ordered pair was new.
    Inserted,
    /// The ordered pair existed; its sign was overwritten.
    Replaced,
}

/// A triple refused during [`SignedGraph::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTriple {
    /// Zero-based position of the triple in the ingested sequence.
    pub position: usize,
    pub error: GraphError,
}

/// Outcome of a best-effort bulk ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub replaced: usize,
    pub rejected: Vec<RejectedTriple>,
}

impl IngestReport {
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.inserted + self.replaced
    }
}

impl SignedGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from triples, discarding (and logging) invalid ones.
    #[must_use]
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> (Self, IngestReport) {
        let mut graph = Self::new();
        let report = graph.ingest(triples);
        (graph, report)
    }

    /// Register a concept without links (e.g. a matrix row with no entries).
    pub fn add_concept(&mut self, name: &str) -> ConceptId {
        let idx = self.ensure_node(name);
        self.graph[idx]
    }

    /// Add or overwrite the link `source → target`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSign`] unless `sign` is `+1` or `-1`. In
    /// that case the graph is left unchanged.
    pub fn add_link(&mut self, source: &str, target: &str, sign: i32) -> Result<LinkChange, GraphError> {
        let influence = Influence::from_sign(sign).ok_or_else(|| GraphError::InvalidSign {
            from: source.to_string(),
            to: target.to_string(),
            sign,
        })?;

        let source_idx = self.ensure_node(source);
        let target_idx = self.ensure_node(target);

        if let Some(edge) = self.graph.find_edge(source_idx, target_idx) {
            self.graph[edge] = influence;
            Ok(LinkChange::Replaced)
        } else {
            self.graph.add_edge(source_idx, target_idx, influence);
            Ok(LinkChange::Inserted)
        }
    }

    /// Apply every triple, collecting one [`RejectedTriple`] per invalid one
    /// instead of stopping at the first.
    #[instrument(skip_all)]
    pub fn ingest(&mut self, triples: impl IntoIterator<Item = Triple>) -> IngestReport {
        let mut report = IngestReport::default();

        for (position, triple) in triples.into_iter().enumerate() {
            match self.add_link(&triple.source, &triple.target, triple.sign) {
                Ok(LinkChange::Inserted) => report.inserted += 1,
                Ok(LinkChange::Replaced) => report.replaced += 1,
                Err(error) => {
                    debug!(position, %error, "rejected triple");
                    report.rejected.push(RejectedTriple { position, error });
                }
            }
        }

        debug!(
            inserted = report.inserted,
            replaced = report.replaced,
            rejected = report.rejected.len(),
            "ingested triples"
        );
        report
    }

    /// Remove a concept and every link touching it.
    ///
    /// Returns `false` if the concept was not present. The concept keeps its
    /// identity in the registry.
    pub fn remove_concept(&mut self, id: ConceptId) -> bool {
        match self.node_map.remove(&id) {
            Some(idx) => {
                self.graph.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Registry holding every concept name ever seen by this graph.
    #[must_use]
    pub const fn registry(&self) -> &ConceptRegistry {
        &self.registry
    }

    /// Number of concepts currently present as nodes.
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[must_use]
    pub fn contains_concept(&self, id: ConceptId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Look up a present concept by name.
    #[must_use]
    pub fn concept(&self, name: &str) -> Option<ConceptId> {
        self.registry.get(name).filter(|id| self.contains_concept(*id))
    }

    /// Sign of the link `source → target`, if present.
    #[must_use]
    pub fn link(&self, source: ConceptId, target: ConceptId) -> Option<Influence> {
        let source_idx = *self.node_map.get(&source)?;
        let target_idx = *self.node_map.get(&target)?;
        self.graph
            .find_edge(source_idx, target_idx)
            .and_then(|edge| self.graph.edge_weight(edge).copied())
    }

    /// Present concepts sorted by name.
    #[must_use]
    pub fn concepts(&self) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self.node_map.keys().copied().collect();
        ids.sort_unstable_by(|a, b| self.registry.compare(*a, *b));
        ids
    }

    /// Every link as `(source, target, influence)`, sorted by source name then
    /// target name.
    #[must_use]
    pub fn links(&self) -> Vec<(ConceptId, ConceptId, Influence)> {
        let mut links: Vec<(ConceptId, ConceptId, Influence)> = self
            .graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()], *edge.weight()))
            .collect();
        links.sort_unstable_by(|a, b| {
            self.registry
                .compare(a.0, b.0)
                .then_with(|| self.registry.compare(a.1, b.1))
        });
        links
    }

    /// Outgoing links of `id` as `(target, influence)`, sorted by target name.
    ///
    /// Returns an empty list for concepts not present in the graph.
    #[must_use]
    pub fn successors(&self, id: ConceptId) -> Vec<(ConceptId, Influence)> {
        let Some(&idx) = self.node_map.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<(ConceptId, Influence)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (self.graph[edge.target()], *edge.weight()))
            .collect();
        out.sort_unstable_by(|a, b| self.registry.compare(a.0, b.0));
        out
    }

    /// Number of links ending at `id` (a self-link counts once).
    #[must_use]
    pub fn in_degree(&self, id: ConceptId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Number of links starting at `id` (a self-link counts once).
    #[must_use]
    pub fn out_degree(&self, id: ConceptId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    fn degree(&self, id: ConceptId, direction: Direction) -> usize {
        self.node_map
            .get(&id)
            .map_or(0, |&idx| self.graph.edges_directed(idx, direction).count())
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        let id = self.registry.intern(name);
        *self
            .node_map
            .entry(id)
            .or_insert_with(|| self.graph.add_node(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph() {
        let graph = SignedGraph::new();
        assert_eq!(graph.concept_count(), 0);
        assert_eq!(graph.link_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.concepts().is_empty());
    }

    #[test]
    fn add_link_registers_both_concepts_once() {
        let mut graph = SignedGraph::new();
        graph.add_link("A", "B", 1).expect("valid link");
        graph.add_link("B", "A", -1).expect("valid link");

        assert_eq!(graph.concept_count(), 2);
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.registry().len(), 2);

        let a = graph.concept("A").expect("A present");
        let b = graph.concept("B").expect("B present");
        assert_eq!(graph.link(a, b), Some(Influence::Increases));
        assert_eq!(graph.link(b, a), Some(Influence::Decreases));
    }

    #[test]
    fn repeated_pair_overwrites_sign() {
        let mut graph = SignedGraph::new();
        assert_eq!(graph.add_link("A", "B", 1), Ok(LinkChange::Inserted));
        assert_eq!(graph.add_link("A", "B", -1), Ok(LinkChange::Replaced));

        assert_eq!(graph.link_count(), 1, "one link per ordered pair");
        let a = graph.concept("A").expect("A");
        let b = graph.concept("B").expect("B");
        assert_eq!(graph.link(a, b), Some(Influence::Decreases), "last write wins");
    }

    #[test]
    fn invalid_sign_registers_nothing() {
        let mut graph = SignedGraph::new();
        let err = graph.add_link("A", "B", 0).expect_err("zero sign rejected");

        assert_eq!(
            err,
            GraphError::InvalidSign {
                from: "A".to_string(),
                to: "B".to_string(),
                sign: 0
            }
        );
        assert!(graph.is_empty());
        assert!(graph.registry().is_empty());
    }

    #[test]
    fn ingest_collects_rejections_and_keeps_going() {
        let triples = vec![
            Triple::new("A", "B", 1),
            Triple::new("B", "C", 2),
            Triple::new("C", "A", -1),
            Triple::new("A", "B", -1),
        ];
        let (graph, report) = SignedGraph::from_triples(triples);

        assert_eq!(report.inserted, 2);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.accepted(), 3);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].position, 1);
        // B is known through A -> B, but the bad B -> C link never landed.
        let b = graph.concept("B").expect("B");
        assert!(graph.successors(b).is_empty());
    }

    #[test]
    fn self_link_counts_in_both_degrees() {
        let mut graph = SignedGraph::new();
        graph.add_link("A", "A", 1).expect("self link");
        let a = graph.concept("A").expect("A");

        assert_eq!(graph.in_degree(a), 1);
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.successors(a), vec![(a, Influence::Increases)]);
    }

    #[test]
    fn links_and_successors_are_name_ordered() {
        let mut graph = SignedGraph::new();
        graph.add_link("hub", "zeta", 1).expect("link");
        graph.add_link("hub", "alpha", -1).expect("link");
        graph.add_link("beta", "hub", 1).expect("link");

        let hub = graph.concept("hub").expect("hub");
        let names: Vec<&str> = graph
            .successors(hub)
            .into_iter()
            .map(|(id, _)| graph.registry().name(id))
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let sources: Vec<&str> = graph
            .links()
            .into_iter()
            .map(|(s, _, _)| graph.registry().name(s))
            .collect();
        assert_eq!(sources, vec!["beta", "hub", "hub"]);
    }

    #[test]
    fn add_concept_without_links() {
        let mut graph = SignedGraph::new();
        let lonely = graph.add_concept("Lonely");
        graph.add_link("Lonely", "B", 1).expect("link");

        assert_eq!(graph.concept("Lonely"), Some(lonely));
        assert_eq!(graph.concept_count(), 2);
    }

    #[test]
    fn remove_concept_drops_incident_links() {
        let mut graph = SignedGraph::new();
        graph.add_link("A", "B", 1).expect("link");
        graph.add_link("B", "C", 1).expect("link");
        let b = graph.concept("B").expect("B");

        assert!(graph.remove_concept(b));
        assert!(!graph.remove_concept(b), "second removal is a no-op");
        assert_eq!(graph.concept_count(), 2);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.concept("B"), None);
        assert_eq!(graph.registry().get("B"), Some(b), "identity survives");
    }
}
