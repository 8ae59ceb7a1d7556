//! Elementary-cycle enumeration over a [`SignedGraph`].
//!
//! # Algorithm
//!
//! Roots are visited in ascending name order. From each root `r` an
//! iterative DFS walks outgoing links, carrying the current path and an
//! on-path bitset. Reaching a successor equal to `r` emits the path as a
//! [`RawCycle`]; successors already on the path are never entered, so every
//! emitted cycle is elementary. A self-link on `r` yields a size-1 cycle.
//!
//! With root retirement enabled (the default), `r` is removed from the
//! working graph once all its branches are exhausted and the graph is
//! re-pruned. Every cycle through `r` has been emitted by then, so later roots
//! never rediscover it. Without retirement each cycle is found once per
//! member; [`crate::loops::LoopSet::build`] merges those rotations.
//!
//! The DFS keeps its own stack instead of recursing, so long cycles cannot
//! exhaust the thread stack. Successor lists are sorted by name once per root
//! and shared by every frame of that root's search.
//!
//! Any graph is accepted, but sources and sinks are searched as roots until
//! the first retirement prunes them, so callers should pass the output of
//! [`SignedGraph::pruned`] as [`crate::Analysis::run`] does.

use fixedbitset::FixedBitSet;
use tracing::{debug, instrument, trace};

use crate::config::SearchConfig;
use crate::error::AnalysisError;
use crate::graph::build::SignedGraph;
use crate::model::{ConceptId, Influence};

/// A cycle in discovery order.
///
/// `signs[i]` is the sign of the link `members[i] → members[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCycle {
    pub members: Vec<ConceptId>,
    pub signs: Vec<Influence>,
}

impl RawCycle {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Enumerates every elementary cycle of a graph.
#[derive(Debug)]
pub struct CycleFinder<'g> {
    graph: &'g SignedGraph,
    config: SearchConfig,
}

type Successors = Vec<(ConceptId, Influence)>;

/// One DFS level: the successors of a path member and the next one to try.
struct Frame<'a> {
    successors: &'a [(ConceptId, Influence)],
    next: usize,
}

impl<'g> CycleFinder<'g> {
    #[must_use]
    pub const fn new(graph: &'g SignedGraph, config: SearchConfig) -> Self {
        Self { graph, config }
    }

    /// Enumerate all elementary cycles.
    ///
    /// The input graph is not modified; root retirement works on a copy. A
    /// graph without cycles yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::LoopLimitExceeded`] when more raw cycles than
    /// [`SearchConfig::max_loops`] are found.
    #[instrument(skip(self), fields(concepts = self.graph.concept_count(), retire_roots = self.config.retire_roots))]
    pub fn find(&self) -> Result<Vec<RawCycle>, AnalysisError> {
        let mut working = self.graph.clone();
        let roots = working.concepts();
        let mut cycles = Vec::new();

        for root in roots {
            // Retiring earlier roots may have pruned this one away.
            if !working.contains_concept(root) {
                continue;
            }

            let before = cycles.len();
            self.search_from(&working, root, &mut cycles)?;
            trace!(
                root = working.registry().name(root),
                found = cycles.len() - before,
                "searched root"
            );

            if self.config.retire_roots {
                working.remove_concept(root);
                working.prune();
            }
        }

        debug!(candidates = cycles.len(), "cycle search complete");
        Ok(cycles)
    }

    fn search_from(
        &self,
        graph: &SignedGraph,
        root: ConceptId,
        out: &mut Vec<RawCycle>,
    ) -> Result<(), AnalysisError> {
        let adjacency = successor_table(graph);
        let mut on_path = FixedBitSet::with_capacity(adjacency.len());
        let mut path: Vec<ConceptId> = vec![root];
        let mut signs: Vec<Influence> = Vec::new();
        on_path.insert(root.index());

        let mut stack: Vec<Frame<'_>> = vec![Frame {
            successors: &adjacency[root.index()],
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let step = frame.successors.get(frame.next).copied();
            frame.next += 1;

            match step {
                Some((next, influence)) if next == root => {
                    let mut cycle_signs = signs.clone();
                    cycle_signs.push(influence);
                    out.push(RawCycle {
                        members: path.clone(),
                        signs: cycle_signs,
                    });
                    self.check_limit(graph, root, out.len())?;
                }
                Some((next, influence)) => {
                    if !on_path.contains(next.index()) {
                        on_path.insert(next.index());
                        path.push(next);
                        signs.push(influence);
                        stack.push(Frame {
                            successors: &adjacency[next.index()],
                            next: 0,
                        });
                    }
                }
                None => {
                    stack.pop();
                    if let Some(done) = path.pop() {
                        on_path.set(done.index(), false);
                    }
                    signs.pop();
                }
            }
        }

        Ok(())
    }

    fn check_limit(&self, graph: &SignedGraph, root: ConceptId, found: usize) -> Result<(), AnalysisError> {
        match self.config.max_loops {
            Some(limit) if found > limit => Err(AnalysisError::LoopLimitExceeded {
                limit,
                root: graph.registry().name(root).to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Name-sorted successors of every concept, indexed by [`ConceptId::index`].
fn successor_table(graph: &SignedGraph) -> Vec<Successors> {
    let mut table = vec![Vec::new(); graph.registry().len()];
    for id in graph.concepts() {
        table[id.index()] = graph.successors(id);
    }
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
