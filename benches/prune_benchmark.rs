//! Criterion benchmarks for pruning and single-action cross-sums.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use incprune::alpha::AlphaVector;
use incprune::config::{CrossSumVariant, IncPruneVariant, PruneStrength};
use incprune::cross_sum::CrossSumEngine;
use incprune::lp::DenseSimplex;
use incprune::model::ProblemDimensions;
use incprune::numeric::Tolerance;
use incprune::problems;
use incprune::projection::ProjectionTables;
use incprune::prune::Pruner;
use incprune::vector_set::VectorSet;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_set(count: usize, states: usize, seed: u64) -> VectorSet {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let values: Array1<f64> = (0..states).map(|_| rng.gen_range(-10.0..10.0)).collect();
            AlphaVector::new(0, values)
        })
        .collect()
}

fn bench_prune_strengths(c: &mut Criterion) {
    let lp = DenseSimplex::default();
    let mut group = c.benchmark_group("prune");

    for &count in &[16usize, 64, 256] {
        let set = random_set(count, 4, 3);
        for strength in [PruneStrength::DomOnly, PruneStrength::Normal] {
            let pruner = Pruner::new(strength, Tolerance::default(), 1e-9, &lp);
            group.bench_with_input(BenchmarkId::new(strength.name(), count), &set, |b, set| {
                b.iter(|| black_box(pruner.prune(black_box(set)).unwrap().len()))
            });
        }
    }

    group.finish();
}

fn bench_cross_sum_variants(c: &mut Criterion) {
    let lp = DenseSimplex::default();
    let pruner = Pruner::new(PruneStrength::Normal, Tolerance::default(), 1e-9, &lp);
    let model = problems::random_pomdp(ProblemDimensions::new(4, 1, 3), 0.95, 17);
    let tables = ProjectionTables::new(&model);
    let previous = pruner.prune(&random_set(24, 4, 5)).unwrap();
    let projected: Vec<VectorSet> = (0..3)
        .map(|o| pruner.prune(&tables.project(&previous, 0, o)).unwrap())
        .collect();

    let mut group = c.benchmark_group("cross_sum");
    group.sample_size(20);
    for (variant, incprune) in [
        (CrossSumVariant::Enumerate, IncPruneVariant::Normal),
        (CrossSumVariant::IncPrune, IncPruneVariant::Normal),
        (CrossSumVariant::IncPrune, IncPruneVariant::RestrictedRegion),
        (CrossSumVariant::IncPrune, IncPruneVariant::Generalized),
        (CrossSumVariant::Witness, IncPruneVariant::Normal),
        (CrossSumVariant::TwoPass, IncPruneVariant::Normal),
        (CrossSumVariant::LinearSupport, IncPruneVariant::Normal),
    ] {
        let engine = CrossSumEngine::new(variant, incprune, pruner);
        let id = format!("{}_{}", variant, incprune);
        group.bench_function(id, |b| {
            b.iter(|| black_box(engine.combine(black_box(&projected)).unwrap().len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prune_strengths, bench_cross_sum_variants);
criterion_main!(benches);
