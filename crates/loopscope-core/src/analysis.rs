//! End-to-end analysis of one signed graph.
//!
//! [`Analysis::run`] prunes the graph, enumerates its loops, builds the
//! [`LoopSet`] and scores every concept. [`Analysis::report`] turns the result
//! into serializable rows for the CLI and its exporters.

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::graph::build::SignedGraph;
use crate::graph::cycles::CycleFinder;
use crate::graph::prune::PruneReport;
use crate::graph::stats::GraphStats;
use crate::loops::distance::DistanceCache;
use crate::loops::set::{LoopSet, LoopSummary};
use crate::model::{Influence, LoopId, LoopKind};
use crate::score::centrality::{CentralityScorer, ConceptScores, RankedConcept};

/// Results of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub loops: LoopSet,
    pub scores: ConceptScores,
    pub prune: PruneReport,
    pub stats: GraphStats,
    /// Raw cycles reported by the search, before deduplication.
    pub candidates: usize,
}

impl Analysis {
    /// Run the full pipeline on `graph`. The graph itself is left untouched.
    ///
    /// A graph without loops is not an error: the loop set and scores come
    /// back empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::LoopLimitExceeded`] if the search exceeds the
    /// configured ceiling, or [`AnalysisError::Scoring`] if scoring fails.
    #[instrument(skip_all, fields(concepts = graph.concept_count(), links = graph.link_count()))]
    pub fn run(graph: &SignedGraph, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let (core, prune) = graph.pruned();
        let stats = GraphStats::from_graph(graph, &core);
        info!(
            removed = prune.removed.len(),
            rounds = prune.rounds,
            core_concepts = stats.core_concept_count,
            "pruned sources and sinks"
        );

        let cycles = CycleFinder::new(&core, config.search).find()?;
        let candidates = cycles.len();
        let loops = LoopSet::build(graph.registry(), cycles);
        info!(
            candidates,
            loops = loops.len(),
            merged = loops.merged_duplicates(),
            "enumerated loops"
        );

        let mut cache = DistanceCache::for_loop_set(&loops);
        let scores = CentralityScorer::new(&loops, &mut cache)
            .with_order(config.scoring.order)
            .score_all()?;
        info!(
            scored = scores.len(),
            distances = cache.len(),
            "scored concepts"
        );

        Ok(Self {
            loops,
            scores,
            prune,
            stats,
            candidates,
        })
    }

    /// Build the output rows for `graph`, which must be the graph this
    /// analysis ran on.
    #[must_use]
    pub fn report(&self, graph: &SignedGraph) -> AnalysisReport {
        let registry = graph.registry();

        let concepts = graph
            .concepts()
            .into_iter()
            .map(|id| ConceptRow {
                name: registry.name(id).to_string(),
                number_of_loops: self.loops.loops_containing(id).len(),
                relevance_score: self.scores.get(id),
            })
            .collect();

        let links = graph
            .links()
            .into_iter()
            .map(|(source, target, influence)| LinkRow {
                source: registry.name(source).to_string(),
                target: registry.name(target).to_string(),
                influence,
                loops_traversing: self.loops.traversal_count(source, target),
            })
            .collect();

        let loops = self
            .loops
            .loops_by_size()
            .into_iter()
            .map(|lp| LoopRow {
                id: lp.id(),
                size: lp.size(),
                kind: lp.kind(),
                negative_links: lp.negative_links(),
                members: lp
                    .members()
                    .iter()
                    .map(|&id| registry.name(id).to_string())
                    .collect(),
                description: lp.shape().describe(registry),
            })
            .collect();

        AnalysisReport {
            fingerprint: self.loops.fingerprint().to_string(),
            concepts,
            links,
            loops,
            ranking: self.scores.ranked(registry),
            stats: self.stats.clone(),
            summary: self.loops.summary(),
        }
    }
}

/// Serializable output of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub fingerprint: String,
    /// Every concept of the graph, in name order.
    pub concepts: Vec<ConceptRow>,
    /// Every link of the graph, ordered by source then target name.
    pub links: Vec<LinkRow>,
    /// Loops by descending size, ties by id.
    pub loops: Vec<LoopRow>,
    pub ranking: Vec<RankedConcept>,
    pub stats: GraphStats,
    pub summary: LoopSummary,
}

impl AnalysisReport {
    #[must_use]
    pub fn concept(&self, name: &str) -> Option<&ConceptRow> {
        self.concepts.iter().find(|row| row.name == name)
    }

    /// The first `n` ranked concepts.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedConcept] {
        &self.ranking[..n.min(self.ranking.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRow {
    pub name: String,
    pub number_of_loops: usize,
    /// `None` for concepts on no loop.
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRow {
    pub source: String,
    pub target: String,
    pub influence: Influence,
    pub loops_traversing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopRow {
    pub id: LoopId,
    pub size: usize,
    #[serde(rename = "type")]
    pub kind: LoopKind,
    pub negative_links: usize,
    pub members: Vec<String>,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
