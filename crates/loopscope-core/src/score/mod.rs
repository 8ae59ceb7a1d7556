//! Concept relevance scoring.
//!
//! A concept that sits on many *different* loops matters more than one that
//! sits on many near-copies of the same loop. [`centrality`] rewards each
//! loop by how far it is from the loops already credited to the concept.

pub mod centrality;

pub use centrality::{CentralityScorer, ConceptScores, LoopOrder, RankedConcept};
