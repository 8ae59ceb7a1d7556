use std::collections::HashSet;

use loopscope_core::config::{AnalysisConfig, SearchConfig};
use loopscope_core::graph::{CycleFinder, SignedGraph};
use loopscope_core::loops::{LoopCanonicalizer, LoopSet, cyclic_distance};
use loopscope_core::model::LoopKind;
use loopscope_core::Analysis;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Random signed graphs on up to six concepts, self-links included.
fn arb_graph() -> impl Strategy<Value = SignedGraph> {
    (1usize..=6).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n, any::<bool>()), 0..=14).prop_map(move |edges| {
            let mut graph = SignedGraph::new();
            for i in 0..n {
                graph.add_concept(&format!("c{i}"));
            }
            for (source, target, negative) in edges {
                let sign = if negative { -1 } else { 1 };
                graph
                    .add_link(&format!("c{source}"), &format!("c{target}"), sign)
                    .expect("unit sign");
            }
            graph
        })
    })
}

fn arb_sequence() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..7)
}

fn loop_set(graph: &SignedGraph, retire_roots: bool) -> LoopSet {
    let config = SearchConfig {
        retire_roots,
        max_loops: None,
    };
    let cycles = CycleFinder::new(graph, config).find().expect("no limit");
    LoopSet::build(graph.registry(), cycles)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn loops_are_elementary_and_follow_real_links(graph in arb_graph()) {
        let loops = loop_set(&graph, true);
        for lp in loops.loops() {
            let unique: HashSet<_> = lp.members().iter().collect();
            prop_assert_eq!(unique.len(), lp.size());

            for (source, target, sign) in lp.shape().links() {
                prop_assert_eq!(graph.link(source, target), Some(sign));
            }
        }
    }

    #[test]
    fn loop_set_has_no_rotational_duplicates(graph in arb_graph()) {
        let loops = loop_set(&graph, false);
        let canonicalizer = LoopCanonicalizer::new(graph.registry());
        let mut seen = HashSet::new();

        for lp in loops.loops() {
            prop_assert!(seen.insert(lp.members().to_vec()));
            prop_assert_eq!(&canonicalizer.recanonicalize(lp.shape()), lp.shape());

            let first = graph.registry().name(lp.members()[0]);
            for &member in lp.members() {
                prop_assert!(first <= graph.registry().name(member));
            }
        }
    }

    #[test]
    fn loop_ids_follow_canonical_order(graph in arb_graph()) {
        let loops = loop_set(&graph, true);
        let registry = graph.registry();
        for pair in loops.loops().windows(2) {
            prop_assert_eq!(
                registry.compare_sequences(pair[0].members(), pair[1].members()),
                std::cmp::Ordering::Less
            );
        }
    }

    #[test]
    fn kind_matches_negative_link_parity(graph in arb_graph()) {
        for lp in loop_set(&graph, true).loops() {
            let negatives = lp.signs().iter().filter(|sign| sign.is_negative()).count();
            let expected = if negatives % 2 == 0 {
                LoopKind::Reinforcing
            } else {
                LoopKind::Balancing
            };
            prop_assert_eq!(lp.kind(), expected);
            prop_assert_eq!(lp.negative_links(), negatives);
        }
    }

    #[test]
    fn retiring_roots_finds_the_same_loops(graph in arb_graph()) {
        let retired = loop_set(&graph, true);
        let exhaustive = loop_set(&graph, false);
        prop_assert_eq!(retired.loops(), exhaustive.loops());
        prop_assert_eq!(retired.fingerprint(), exhaustive.fingerprint());
    }

    #[test]
    fn pruning_is_idempotent_and_leaves_no_sources_or_sinks(graph in arb_graph()) {
        let (once, _) = graph.pruned();
        let (twice, second) = once.pruned();

        prop_assert!(second.is_noop());
        prop_assert_eq!(once.concepts(), twice.concepts());
        prop_assert_eq!(once.links(), twice.links());
        for id in once.concepts() {
            prop_assert!(once.in_degree(id) > 0);
            prop_assert!(once.out_degree(id) > 0);
        }
    }

    #[test]
    fn pruning_never_loses_a_loop(graph in arb_graph()) {
        let (core, _) = graph.pruned();
        let full = loop_set(&graph, true);
        let pruned = loop_set(&core, true);
        prop_assert_eq!(full.fingerprint(), pruned.fingerprint());
    }

    #[test]
    fn distance_identity(a in arb_sequence()) {
        prop_assert_eq!(cyclic_distance(&a, &a), 0);
    }

    #[test]
    fn distance_symmetry(a in arb_sequence(), b in arb_sequence()) {
        prop_assert_eq!(cyclic_distance(&a, &b), cyclic_distance(&b, &a));
    }

    #[test]
    fn distance_rotation_invariance(
        a in arb_sequence(),
        b in arb_sequence(),
        shift in 0usize..7,
    ) {
        let mut rotated = a.clone();
        if !rotated.is_empty() {
            let by = shift % rotated.len();
            rotated.rotate_left(by);
        }
        prop_assert_eq!(cyclic_distance(&rotated, &a), 0);
        prop_assert_eq!(cyclic_distance(&rotated, &b), cyclic_distance(&a, &b));
    }

    #[test]
    fn distance_is_bounded_by_lengths(a in arb_sequence(), b in arb_sequence()) {
        let d = cyclic_distance(&a, &b);
        prop_assert!(d >= a.len().abs_diff(b.len()));
        prop_assert!(d <= a.len().max(b.len()));
    }

    #[test]
    fn scoring_is_deterministic_and_covers_loop_members(graph in arb_graph()) {
        let config = AnalysisConfig::default();
        let first = Analysis::run(&graph, &config).expect("analysis");
        let second = Analysis::run(&graph, &config).expect("analysis");

        prop_assert_eq!(&first.scores, &second.scores);
        prop_assert_eq!(first.scores.len(), first.loops.concepts().count());
        for (_, score) in first.scores.iter() {
            prop_assert!(score >= 0.0);
        }
    }
}
