//! The deduplicated set of loops found in one analysis run.
//!
//! [`LoopSet::build`] canonicalizes raw cycles, merges rotations of the same
//! cycle, sorts the survivors by canonical name sequence and numbers them.
//! `LoopId(i)` is the `i`-th loop in that order, so comparing ids compares
//! canonical sequences. The set is immutable once built.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::graph::cycles::RawCycle;
use crate::loops::canonical::{CanonicalLoop, LoopCanonicalizer};
use crate::model::{ConceptId, Influence, LoopId, LoopKind, Polarity};
use crate::registry::ConceptRegistry;

/// A canonical loop with its identity in a [`LoopSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    id: LoopId,
    shape: CanonicalLoop,
}

impl Loop {
    #[must_use]
    pub const fn id(&self) -> LoopId {
        self.id
    }

    #[must_use]
    pub const fn shape(&self) -> &CanonicalLoop {
        &self.shape
    }

    #[must_use]
    pub fn members(&self) -> &[ConceptId] {
        self.shape.members()
    }

    #[must_use]
    pub fn signs(&self) -> &[Influence] {
        self.shape.signs()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    #[must_use]
    pub fn negative_links(&self) -> usize {
        self.shape.negative_links()
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.shape.polarity()
    }

    #[must_use]
    pub fn kind(&self) -> LoopKind {
        self.shape.kind()
    }
}

/// Loop counts by kind and by size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub total: usize,
    pub reinforcing: usize,
    pub balancing: usize,
    /// Number of loops of each size, ascending by size.
    pub by_size: BTreeMap<usize, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LoopSet {
    loops: Vec<Loop>,
    by_concept: BTreeMap<ConceptId, Vec<LoopId>>,
    by_link: HashMap<(ConceptId, ConceptId), usize>,
    names: HashMap<ConceptId, String>,
    fingerprint: String,
    merged_duplicates: usize,
}

impl LoopSet {
    /// Canonicalize, deduplicate and index `cycles`.
    #[must_use]
    pub fn build(registry: &ConceptRegistry, cycles: impl IntoIterator<Item = RawCycle>) -> Self {
        let canonicalizer = LoopCanonicalizer::new(registry);
        let mut shapes: Vec<CanonicalLoop> = cycles
            .into_iter()
            .filter(|cycle| !cycle.is_empty())
            .map(|cycle| canonicalizer.canonicalize(&cycle))
            .collect();
        let candidates = shapes.len();

        shapes.sort_by(|a, b| registry.compare_sequences(a.members(), b.members()));
        // Names are unique, so equal name sequences are equal member sequences,
        // and a member sequence fixes its signs.
        shapes.dedup_by(|a, b| a.members() == b.members());
        let merged_duplicates = candidates - shapes.len();

        let loops: Vec<Loop> = shapes
            .into_iter()
            .enumerate()
            .map(|(idx, shape)| Loop {
                id: LoopId::from_index(idx),
                shape,
            })
            .collect();

        let mut by_concept: BTreeMap<ConceptId, Vec<LoopId>> = BTreeMap::new();
        let mut by_link: HashMap<(ConceptId, ConceptId), usize> = HashMap::new();
        let mut names: HashMap<ConceptId, String> = HashMap::new();
        for lp in &loops {
            for &member in lp.members() {
                by_concept.entry(member).or_default().push(lp.id);
                names
                    .entry(member)
                    .or_insert_with(|| registry.name(member).to_string());
            }
            for (source, target, _) in lp.shape.links() {
                *by_link.entry((source, target)).or_insert(0) += 1;
            }
        }

        let fingerprint = compute_fingerprint(registry, &loops);
        debug!(
            loops = loops.len(),
            merged_duplicates,
            fingerprint = %fingerprint,
            "built loop set"
        );

        Self {
            loops,
            by_concept,
            by_link,
            names,
            fingerprint,
            merged_duplicates,
        }
    }

    /// All loops in `LoopId` order.
    #[must_use]
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    #[must_use]
    pub fn get(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id.index())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// BLAKE3 hash of the canonical loops, prefixed with `blake3:`.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Raw candidates that collapsed onto an existing loop.
    #[must_use]
    pub const fn merged_duplicates(&self) -> usize {
        self.merged_duplicates
    }

    /// Loops that `concept` participates in, ascending by id.
    #[must_use]
    pub fn loops_containing(&self, concept: ConceptId) -> &[LoopId] {
        self.by_concept.get(&concept).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Concepts that participate in at least one loop, ascending by id.
    pub fn concepts(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.by_concept.keys().copied()
    }

    /// Name of a concept that participates in a loop, `""` otherwise.
    #[must_use]
    pub fn concept_name(&self, concept: ConceptId) -> &str {
        self.names.get(&concept).map_or("", String::as_str)
    }

    /// Number of loops that traverse the link `source → target`.
    #[must_use]
    pub fn traversal_count(&self, source: ConceptId, target: ConceptId) -> usize {
        self.by_link.get(&(source, target)).copied().unwrap_or(0)
    }

    /// Loops by descending size, ties by ascending id.
    #[must_use]
    pub fn loops_by_size(&self) -> Vec<&Loop> {
        let mut ordered: Vec<&Loop> = self.loops.iter().collect();
        ordered.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.id.cmp(&b.id)));
        ordered
    }

    #[must_use]
    pub fn summary(&self) -> LoopSummary {
        let mut summary = LoopSummary {
            total: self.loops.len(),
            ..LoopSummary::default()
        };
        for lp in &self.loops {
            match lp.kind() {
                LoopKind::Reinforcing => summary.reinforcing += 1,
                LoopKind::Balancing => summary.balancing += 1,
            }
            *summary.by_size.entry(lp.size()).or_insert(0) += 1;
        }
        summary
    }
}

fn compute_fingerprint(registry: &ConceptRegistry, loops: &[Loop]) -> String {
    let mut hasher = blake3::Hasher::new();
    for lp in loops {
        for (source, _, sign) in lp.shape.links() {
            hasher.update(registry.name(source).as_bytes());
            hasher.update(b"\x00");
            hasher.update(&[u8::from(sign.is_negative())]);
        }
        hasher.update(b"\x1e");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::graph::build::SignedGraph;
    use crate::graph::cycles::CycleFinder;

    fn graph(edges: &[(&str, &str, i32)]) -> SignedGraph {
        let mut graph = SignedGraph::new();
        for &(source, target, sign) in edges {
            graph.add_link(source, target, sign).expect("valid link");
        }
        graph
    }

    fn loop_set(graph: &SignedGraph, retire_roots: bool) -> LoopSet {
        let config = SearchConfig {
            retire_roots,
            max_loops: None,
        };
        let cycles = CycleFinder::new(graph, config).find().expect("search");
        LoopSet::build(graph.registry(), cycles)
    }

    fn names(graph: &SignedGraph, lp: &Loop) -> Vec<String> {
        lp.members()
            .iter()
            .map(|&id| graph.registry().name(id).to_string())
            .collect()
    }

    /// Ring A->B->C->D->A with chord B->D.
    fn ring_with_chord() -> SignedGraph {
        graph(&[
            ("A", "B", 1),
            ("B", "C", 1),
            ("C", "D", -1),
            ("D", "A", 1),
            ("B", "D", 1),
        ])
    }

    #[test]
    fn rotations_of_one_cycle_merge() {
        let g = graph(&[("A", "B", 1), ("B", "C", 1), ("C", "A", -1)]);
        let set = loop_set(&g, false);

        assert_eq!(set.len(), 1);
        assert_eq!(set.merged_duplicates(), 2);
        assert_eq!(names(&g, &set.loops()[0]), vec!["A", "B", "C"]);
        assert_eq!(set.loops()[0].kind(), LoopKind::Balancing);
    }

    #[test]
    fn ids_follow_canonical_sequence_order() {
        let g = ring_with_chord();
        let set = loop_set(&g, true);

        let sequences: Vec<Vec<String>> = set.loops().iter().map(|lp| names(&g, lp)).collect();
        assert_eq!(
            sequences,
            vec![vec!["A", "B", "C", "D"], vec!["A", "B", "D"]]
        );
        for (idx, lp) in set.loops().iter().enumerate() {
            assert_eq!(lp.id().index(), idx);
        }
    }

    #[test]
    fn concept_and_link_indices() {
        let g = ring_with_chord();
        let set = loop_set(&g, true);
        let id = |name| g.concept(name).expect("concept");

        assert_eq!(set.loops_containing(id("A")).len(), 2);
        assert_eq!(set.loops_containing(id("C")).len(), 1);
        assert_eq!(set.traversal_count(id("D"), id("A")), 2);
        assert_eq!(set.traversal_count(id("B"), id("D")), 1);
        assert_eq!(set.traversal_count(id("A"), id("C")), 0);
        assert_eq!(set.concepts().count(), 4);
        assert_eq!(set.concept_name(id("C")), "C");
    }

    #[test]
    fn concept_outside_loops_has_empty_slice() {
        let g = graph(&[("A", "B", 1), ("B", "A", 1), ("B", "Z", 1)]);
        let set = loop_set(&g, true);
        let z = g.concept("Z").expect("concept");

        assert!(set.loops_containing(z).is_empty());
        assert_eq!(set.concepts().count(), 2);
    }

    #[test]
    fn loops_by_size_is_descending() {
        let g = graph(&[("A", "A", 1), ("A", "B", 1), ("B", "C", 1), ("C", "A", 1), ("B", "A", -1)]);
        let set = loop_set(&g, true);

        let sizes: Vec<usize> = set.loops_by_size().iter().map(|lp| lp.size()).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
    }

    #[test]
    fn summary_counts_kinds_and_sizes() {
        let g = graph(&[("A", "A", -1), ("A", "B", 1), ("B", "A", 1), ("B", "C", 1), ("C", "B", -1)]);
        let summary = loop_set(&g, true).summary();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.reinforcing, 1);
        assert_eq!(summary.balancing, 2);
        assert_eq!(summary.by_size, BTreeMap::from([(1, 1), (2, 2)]));
    }

    #[test]
    fn fingerprint_depends_on_loops() {
        let a = loop_set(&graph(&[("A", "B", 1), ("B", "A", 1)]), true);
        let b = loop_set(&graph(&[("B", "A", 1), ("A", "B", 1)]), true);
        let c = loop_set(&graph(&[("A", "B", 1), ("B", "A", -1)]), true);

        assert!(a.fingerprint().starts_with("blake3:"));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn empty_set() {
        let set = LoopSet::build(&ConceptRegistry::new(), Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.summary(), LoopSummary::default());
        assert!(set.loops_by_size().is_empty());
    }
}
