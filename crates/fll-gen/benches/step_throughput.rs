use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fll_core::{HypergraphMode, ParameterSpec, SeedingPolicy};
use fll_gen::{run, NoopProgress};

fn step_throughput(c: &mut Criterion) {
    let graph = ParameterSpec::graph(0.3, 0.8, 5, SeedingPolicy::Isolated)
        .with_target_nodes(10_000)
        .validate()
        .unwrap();
    c.bench_function("graph_10k_nodes", |b| {
        b.iter(|| black_box(run(&graph, 42, &mut NoopProgress).unwrap()));
    });

    let cutoff = ParameterSpec::hypergraph(0.2443, 0.9428, 5, HypergraphMode::Cutoff)
        .with_max_steps(50_000)
        .validate()
        .unwrap();
    c.bench_function("cutoff_50k_steps", |b| {
        b.iter(|| black_box(run(&cutoff, 42, &mut NoopProgress).unwrap()));
    });
}

criterion_group!(benches, step_throughput);
criterion_main!(benches);
