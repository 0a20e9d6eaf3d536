//! Forward pass benchmarks.
//!
//! # Methodology
//!
//! **Network per size**: a fresh seeded `Rbfn` is built for every basis
//! count so all variants start from identical weights.
//!
//! **Throughput metric**: `Elements` = number of basis functions evaluated
//! per forward pass (`B`), the dominant cost for every shaping.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rbfn::{GaussianRbf, Rbfn, RbfnConfig, Variant};

const INPUT_DIM: usize = 2;
const OUTPUT_DIM: usize = 4;

fn make_inputs(dim: usize, count: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

fn make_network(variant: Variant, bases_per_dim: usize) -> Rbfn {
    let mut config =
        RbfnConfig::for_variant(variant, INPUT_DIM, bases_per_dim, OUTPUT_DIM, 0.1, 0.001);
    config.init_seed = Some(42);
    let sigma = 2.0 / bases_per_dim as f64;
    let kernel = GaussianRbf::grid(bases_per_dim, INPUT_DIM, (-1.0, 1.0), sigma)
        .expect("grid kernel");
    Rbfn::new(config, kernel).expect("valid network")
}

fn bench_evaluate(c: &mut Criterion) {
    let inputs = make_inputs(INPUT_DIM, 64, 7);

    for variant in [Variant::Rbfn, Variant::Normalized, Variant::Hyperplane] {
        let mut group = c.benchmark_group(format!("evaluate/{:?}", variant));

        for &bases_per_dim in &[4_usize, 8, 16, 32] {
            let network = make_network(variant, bases_per_dim);
            group.throughput(Throughput::Elements(network.num_bases() as u64));
            group.bench_with_input(
                BenchmarkId::from_parameter(network.num_bases()),
                &bases_per_dim,
                |b, _| {
                    let mut i = 0;
                    b.iter(|| {
                        i = (i + 1) % inputs.len();
                        black_box(network.evaluate(black_box(&inputs[i])).unwrap());
                    });
                },
            );
        }

        group.finish();
    }
}

fn bench_kernel_activation(c: &mut Criterion) {
    let inputs = make_inputs(INPUT_DIM, 64, 11);
    let mut group = c.benchmark_group("kernel_activation");

    for &bases_per_dim in &[8_usize, 32] {
        let network = make_network(Variant::Rbfn, bases_per_dim);
        group.throughput(Throughput::Elements(network.num_bases() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(network.num_bases()),
            &bases_per_dim,
            |b, _| {
                b.iter(|| {
                    black_box(network.kernel().activation(black_box(&inputs[0])).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_kernel_activation);
criterion_main!(benches);
