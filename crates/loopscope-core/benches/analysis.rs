use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use loopscope_core::config::{AnalysisConfig, SearchConfig};
use loopscope_core::graph::{CycleFinder, SignedGraph};
use loopscope_core::loops::{DistanceCache, LoopSet, cyclic_distance};
use loopscope_core::score::CentralityScorer;
use loopscope_core::Analysis;

const SIZES: [usize; 3] = [8, 16, 32];

/// A ring of `n` concepts where every third concept also links back two steps,
/// giving a loop count that grows with `n` without exploding.
fn ring_with_back_links(n: usize) -> SignedGraph {
    let mut graph = SignedGraph::new();
    let name = |i: usize| format!("v{i:03}");
    for i in 0..n {
        let sign = if i % 5 == 0 { -1 } else { 1 };
        graph
            .add_link(&name(i), &name((i + 1) % n), sign)
            .expect("unit sign");
        if i % 3 == 0 && i >= 2 {
            graph
                .add_link(&name(i), &name(i - 2), 1)
                .expect("unit sign");
        }
    }
    graph
}

fn bench_cycle_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis.cycles");

    for n in SIZES {
        let graph = ring_with_back_links(n);
        group.throughput(Throughput::Elements(graph.link_count() as u64));

        for retire_roots in [true, false] {
            let config = SearchConfig {
                retire_roots,
                max_loops: None,
            };
            let label = if retire_roots { "retire" } else { "exhaustive" };
            group.bench_with_input(BenchmarkId::new(label, n), &graph, |b, graph| {
                b.iter(|| black_box(CycleFinder::new(graph, config).find()));
            });
        }
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis.scoring");

    for n in SIZES {
        let graph = ring_with_back_links(n);
        let Ok(cycles) = CycleFinder::new(&graph, SearchConfig::default()).find() else {
            continue;
        };
        let loops = LoopSet::build(graph.registry(), cycles);

        group.bench_with_input(BenchmarkId::new("greedy", n), &loops, |b, loops| {
            b.iter(|| {
                let mut cache = DistanceCache::for_loop_set(loops);
                black_box(CentralityScorer::new(loops, &mut cache).score_all())
            });
        });
    }

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis.distance");

    for len in [4_usize, 8, 16] {
        let a: Vec<usize> = (0..len).collect();
        let b: Vec<usize> = (0..len).rev().collect();
        group.bench_with_input(BenchmarkId::new("cyclic", len), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(cyclic_distance(a, b)));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let graph = ring_with_back_links(32);
    let config = AnalysisConfig::default();
    c.bench_function("analysis.pipeline/32", |b| {
        b.iter(|| black_box(Analysis::run(&graph, &config)));
    });
}

criterion_group!(
    benches,
    bench_cycle_search,
    bench_scoring,
    bench_distance,
    bench_pipeline
);
criterion_main!(benches);
