//! Error types surfaced by the analysis core.
//!
//! Ingestion errors ([`GraphError`]) are per-triple and recoverable: bulk
//! ingestion collects them and keeps going. Everything raised during cycle
//! search or scoring ([`AnalysisError`]) aborts the run, because partial
//! scores are not meaningful.

use crate::model::LoopId;

/// Errors raised while adding links to a [`crate::graph::SignedGraph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The sign of a link was not `+1` or `-1`.
    #[error("invalid sign {sign} for link {from} -> {to}: expected +1 or -1")]
    InvalidSign { from: String, to: String, sign: i32 },
}

/// Fatal errors raised while enumerating loops or scoring concepts.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A distance was requested for loops outside the cache's loop universe.
    #[error("cannot compute distance between {left} and {right}: {reason}")]
    DistanceComputation {
        left: LoopId,
        right: LoopId,
        reason: String,
    },

    /// Cycle search produced more candidates than the configured ceiling.
    #[error("loop limit of {limit} exceeded while searching from concept {root:?}")]
    LoopLimitExceeded { limit: usize, root: String },

    /// Scoring a concept failed.
    #[error("failed to score concept {concept:?}")]
    Scoring {
        concept: String,
        #[source]
        source: Box<AnalysisError>,
    },
}
