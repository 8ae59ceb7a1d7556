#![forbid(unsafe_code)]
//! loopscope-core library.
//!
//! Finds every feedback loop in a causal loop diagram (a directed graph whose
//! links carry a `+1`/`-1` sign) and ranks concepts by how many structurally
//! *different* loops they sit on.
//!
//! ## Pipeline
//!
//! ```text
//! (source, target, sign) triples
//!        ↓  graph::SignedGraph::ingest()
//! SignedGraph
//!        ↓  SignedGraph::pruned()          (iterative source/sink removal)
//!        ↓  graph::cycles::CycleFinder     (explicit-stack DFS)
//! Vec<RawCycle>
//!        ↓  loops::set::LoopSet::build()   (canonical rotation + dedup)
//! LoopSet
//!        ↓  score::centrality::CentralityScorer (+ loops::distance::DistanceCache)
//! ConceptScores
//!        ↓  analysis::Analysis::report()
//! AnalysisReport
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed errors in [`error`] (`thiserror`); config loading
//!   returns `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Determinism**: every public iteration order is defined by concept
//!   names or loop ids, never by hash-map order.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod loops;
pub mod model;
pub mod registry;
pub mod score;

pub use analysis::{Analysis, AnalysisReport};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, GraphError};
pub use graph::SignedGraph;
pub use loops::{Loop, LoopSet};
pub use model::{ConceptId, Influence, LoopId, LoopKind, Polarity, Triple};
pub use registry::ConceptRegistry;
pub use score::{ConceptScores, LoopOrder, RankedConcept};
