//! Canonical loops, the deduplicated loop set, and cyclic distances.
//!
//! - [`canonical`]: rotate a raw cycle to start at its smallest-named member
//!   and derive its polarity and kind.
//! - [`set`]: the deduplicated [`LoopSet`] with per-concept and per-link
//!   indices.
//! - [`distance`]: rotation-invariant edit distance and the run-scoped
//!   [`DistanceCache`].

pub mod canonical;
pub mod distance;
pub mod set;

pub use canonical::{CanonicalLoop, LoopCanonicalizer};
pub use distance::{DistanceCache, cyclic_distance};
pub use set::{Loop, LoopSet, LoopSummary};
