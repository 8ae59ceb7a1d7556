//! Signed causal graph, pruning and cycle enumeration.
//!
//! # Overview
//!
//! [`SignedGraph`] stores concepts as nodes of a petgraph
//! `StableDiGraph` and links as edges weighted by their
//! [`crate::model::Influence`]. A stable graph keeps node indices valid across
//! removals, which both pruning and root retirement rely on.
//!
//! ## Pipeline
//!
//! ```text
//! triples
//!        ↓  build::SignedGraph::ingest()
//! SignedGraph (may contain sources, sinks and isolated concepts)
//!        ↓  prune::SignedGraph::pruned()
//! SignedGraph (every concept has in-degree ≥ 1 and out-degree ≥ 1)
//!        ↓  cycles::CycleFinder::find()
//! Vec<RawCycle>
//! ```
//!
//! [`stats::GraphStats`] summarises a graph before and after pruning.

pub mod build;
pub mod cycles;
pub mod prune;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::{IngestReport, LinkChange, RejectedTriple, SignedGraph};
pub use cycles::{CycleFinder, RawCycle};
pub use prune::PruneReport;
pub use stats::GraphStats;
