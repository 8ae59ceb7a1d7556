//! Iterative source/sink removal.
//!
//! A concept with no incoming link cannot be re-entered, and one with no
//! outgoing link cannot be left, so neither can lie on a cycle. Removing such
//! concepts can expose new sources and sinks, so removal repeats until a
//! fixed point. No cycle is ever lost.

use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::SignedGraph;
use crate::model::ConceptId;

/// What one call to [`SignedGraph::prune`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Removed concepts, in removal order (each round sorted by name).
    pub removed: Vec<ConceptId>,
    /// Number of rounds that removed at least one concept.
    pub rounds: usize,
}

impl PruneReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }
}

impl SignedGraph {
    /// Remove sources and sinks until every remaining concept has at least one
    /// incoming and one outgoing link.
    ///
    /// Idempotent: pruning an already-pruned graph removes nothing.
    #[instrument(skip(self), fields(concepts = self.concept_count()))]
    pub fn prune(&mut self) -> PruneReport {
        let mut report = PruneReport::default();

        loop {
            let mut doomed: Vec<ConceptId> = self
                .graph
                .node_indices()
                .filter(|&idx| self.is_source_or_sink(idx))
                .map(|idx| self.graph[idx])
                .collect();

            if doomed.is_empty() {
                break;
            }

            doomed.sort_unstable_by(|a, b| self.registry.compare(*a, *b));
            for &id in &doomed {
                self.remove_concept(id);
            }

            report.rounds += 1;
            report.removed.extend(doomed);
        }

        debug!(
            removed = report.removed.len(),
            rounds = report.rounds,
            remaining = self.concept_count(),
            "pruned sources and sinks"
        );
        report
    }

    /// Pruned copy of this graph; `self` is left untouched.
    #[must_use]
    pub fn pruned(&self) -> (Self, PruneReport) {
        let mut copy = self.clone();
        let report = copy.prune();
        (copy, report)
    }

    fn is_source_or_sink(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none()
            || self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
