//! Greedy diversity-weighted loop centrality.
//!
//! For a concept `x` with loops `L(x)`:
//!
//! 1. Order `L(x)` with the scorer's comparator.
//! 2. The first loop contributes `0`.
//! 3. Every later loop `l` contributes `size(l) * min_{s in S} d(l, s)`,
//!    where `S` holds the loops already visited and `d` is
//!    [`crate::loops::cyclic_distance`].
//!
//! The score is the sum of contributions. Concepts on a single loop score `0`;
//! concepts on no loop get no score at all.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::AnalysisError;
use crate::loops::distance::DistanceCache;
use crate::loops::set::{Loop, LoopSet};
use crate::model::{ConceptId, LoopId};
use crate::registry::ConceptRegistry;

/// Built-in loop orderings for the greedy pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopOrder {
    /// Descending size, ties by ascending id.
    #[default]
    LargestFirst,
    /// Ascending size, ties by ascending id.
    SmallestFirst,
}

impl LoopOrder {
    #[must_use]
    pub fn compare(self, a: &Loop, b: &Loop) -> Ordering {
        let by_size = match self {
            Self::LargestFirst => b.size().cmp(&a.size()),
            Self::SmallestFirst => a.size().cmp(&b.size()),
        };
        by_size.then_with(|| a.id().cmp(&b.id()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LargestFirst => "largest-first",
            Self::SmallestFirst => "smallest-first",
        }
    }
}

type Comparator<'a> = Box<dyn Fn(&Loop, &Loop) -> Ordering + 'a>;

/// Scores every concept of a [`LoopSet`].
pub struct CentralityScorer<'a> {
    loops: &'a LoopSet,
    cache: &'a mut DistanceCache,
    comparator: Comparator<'a>,
}

impl<'a> CentralityScorer<'a> {
    #[must_use]
    pub fn new(loops: &'a LoopSet, cache: &'a mut DistanceCache) -> Self {
        Self {
            loops,
            cache,
            comparator: Box::new(|a: &Loop, b: &Loop| LoopOrder::LargestFirst.compare(a, b)),
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: LoopOrder) -> Self {
        self.comparator = Box::new(move |a: &Loop, b: &Loop| order.compare(a, b));
        self
    }

    /// Replace the loop ordering with a custom comparator.
    ///
    /// The comparator should be a total order; ties keep ascending id order.
    #[must_use]
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Loop, &Loop) -> Ordering + 'a,
    {
        self.comparator = Box::new(comparator);
        self
    }

    /// Score every concept that appears in at least one loop.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Scoring`] naming the concept whose distance
    /// lookup failed.
    #[instrument(skip(self), fields(loops = self.loops.len()))]
    pub fn score_all(&mut self) -> Result<ConceptScores, AnalysisError> {
        let mut scores = BTreeMap::new();
        let concepts: Vec<ConceptId> = self.loops.concepts().collect();
        for concept in concepts {
            if let Some(score) = self.score_concept(concept)? {
                scores.insert(concept, score);
            }
        }
        debug!(
            concepts = scores.len(),
            cache_hits = self.cache.hits(),
            cache_misses = self.cache.misses(),
            "scored concepts"
        );
        Ok(ConceptScores { scores })
    }

    /// Score one concept, or `None` if it is on no loop.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Scoring`] if a distance lookup fails.
    pub fn score_concept(&mut self, concept: ConceptId) -> Result<Option<f64>, AnalysisError> {
        let loops = self.loops;
        let mut ordered: Vec<&Loop> = loops
            .loops_containing(concept)
            .iter()
            .filter_map(|&id| loops.get(id))
            .collect();
        if ordered.is_empty() {
            return Ok(None);
        }
        ordered.sort_by(|a, b| (self.comparator)(*a, *b));

        let mut visited: Vec<LoopId> = Vec::with_capacity(ordered.len());
        let mut total: usize = 0;
        for lp in ordered {
            if let Some(nearest) = self.nearest(&visited, lp.id(), concept)? {
                let contribution = lp.size() * nearest;
                trace!(
                    concept = loops.concept_name(concept),
                    loop_id = %lp.id(),
                    nearest,
                    contribution,
                    "loop contribution"
                );
                total += contribution;
            }
            visited.push(lp.id());
        }

        Ok(Some(to_score(total)))
    }

    /// Smallest distance from `candidate` to any visited loop.
    fn nearest(
        &mut self,
        visited: &[LoopId],
        candidate: LoopId,
        concept: ConceptId,
    ) -> Result<Option<usize>, AnalysisError> {
        let mut best: Option<usize> = None;
        for &seen in visited {
            let d = self
                .cache
                .distance(self.loops, candidate, seen)
                .map_err(|source| AnalysisError::Scoring {
                    concept: self.loops.concept_name(concept).to_string(),
                    source: Box::new(source),
                })?;
            best = Some(best.map_or(d, |b| b.min(d)));
            if d == 0 {
                break;
            }
        }
        Ok(best)
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_score(total: usize) -> f64 {
    total as f64
}

/// Scores per concept, iterated in ascending concept id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptScores {
    scores: BTreeMap<ConceptId, f64>,
}

impl ConceptScores {
    #[must_use]
    pub fn get(&self, concept: ConceptId) -> Option<f64> {
        self.scores.get(&concept).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConceptId, f64)> + '_ {
        self.scores.iter().map(|(&id, &score)| (id, score))
    }

    /// Scores sorted descending, ties by ascending name.
    #[must_use]
    pub fn ranked(&self, registry: &ConceptRegistry) -> Vec<RankedConcept> {
        let mut ranked: Vec<RankedConcept> = self
            .iter()
            .map(|(id, score)| RankedConcept {
                name: registry.name(id).to_string(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        ranked
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedConcept {
    pub name: String,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
