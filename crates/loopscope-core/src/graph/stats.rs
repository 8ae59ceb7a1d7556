//! Basic statistics for a signed causal graph.
//!
//! # Statistics Provided
//!
//! - **concept_count** / **link_count**: size of the ingested graph.
//! - **positive_links** / **negative_links**: links by sign.
//! - **self_links**: links from a concept to itself (size-1 loops).
//! - **density**: `link_count / (concept_count * (concept_count - 1))`, zero
//!   for graphs with fewer than two concepts.
//! - **isolated_concept_count**: concepts with no links at all.
//! - **max_in_degree** / **max_out_degree**.
//! - **cyclic_component_count**: strongly connected components that can hold
//!   a loop (more than one member, or a single member with a self-link).
//! - **core_concept_count** / **core_link_count**: what is left after
//!   source/sink pruning. Only these concepts can appear in loops.

use petgraph::algo::tarjan_scc;
use serde::Serialize;

use crate::graph::build::SignedGraph;

/// Summary statistics for a [`SignedGraph`] and its pruned core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub concept_count: usize,
    pub link_count: usize,
    pub positive_links: usize,
    pub negative_links: usize,
    pub self_links: usize,
    pub density: f64,
    pub isolated_concept_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub cyclic_component_count: usize,
    pub core_concept_count: usize,
    pub core_link_count: usize,
}

impl GraphStats {
    /// Compute statistics from the full graph and its pruned core.
    #[must_use]
    pub fn from_graph(graph: &SignedGraph, core: &SignedGraph) -> Self {
        let concepts = graph.concepts();
        let links = graph.links();

        let negative_links = links.iter().filter(|(_, _, sign)| sign.is_negative()).count();
        let self_links = links.iter().filter(|(source, target, _)| source == target).count();

        let isolated_concept_count = concepts
            .iter()
            .filter(|&&id| graph.in_degree(id) == 0 && graph.out_degree(id) == 0)
            .count();

        let max_in_degree = concepts.iter().map(|&id| graph.in_degree(id)).max().unwrap_or(0);
        let max_out_degree = concepts.iter().map(|&id| graph.out_degree(id)).max().unwrap_or(0);

        let cyclic_component_count = tarjan_scc(&graph.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| graph.graph.find_edge(idx, idx).is_some())
            })
            .count();

        Self {
            concept_count: concepts.len(),
            link_count: links.len(),
            positive_links: links.len() - negative_links,
            negative_links,
            self_links,
            density: compute_density(concepts.len(), links.len()),
            isolated_concept_count,
            max_in_degree,
            max_out_degree,
            cyclic_component_count,
            core_concept_count: core.concept_count(),
            core_link_count: core.link_count(),
        }
    }

    /// `true` if no loop can exist in the graph.
    #[must_use]
    pub const fn is_acyclic(&self) -> bool {
        self.cyclic_component_count == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(concept_count: usize, link_count: usize) -> f64 {
    if concept_count < 2 {
        return 0.0_f64;
    }
    let max_links = (concept_count * (concept_count - 1)) as f64;
    link_count as f64 / max_links
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
