//! Criterion microbenches for hull growth and the factorized learner.
//!
//! - Polytope: insert n random points into a seed simplex (d = 3, 5).
//! - Cone: build from a grown polytope.
//! - Multi: one labeling round plus predictions over a candidate pool.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use tsm::geometry::{ComplementCone, ConvexPolytope, Vertex};
use tsm::prelude::*;

fn seed_simplex(dim: usize) -> Vec<Arc<Vertex>> {
    let mut out = vec![Arc::new(Vertex::from_slice(&vec![0.0; dim]))];
    for i in 0..dim {
        let mut e = vec![0.0; dim];
        e[i] = 1.0;
        out.push(Arc::new(Vertex::from_slice(&e)));
    }
    out
}

fn random_points(rng: &mut StdRng, n: usize, dim: usize) -> Vec<Arc<Vertex>> {
    (0..n)
        .map(|_| {
            let xs: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Arc::new(Vertex::from_slice(&xs))
        })
        .collect()
}

fn grown(dim: usize, n: usize, seed: u64) -> ConvexPolytope {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut hull = ConvexPolytope::new(&seed_simplex(dim)).unwrap();
    for p in random_points(&mut rng, n, dim) {
        hull.add_vertex(p).unwrap();
    }
    hull
}

fn bench_polytope(c: &mut Criterion) {
    let mut group = c.benchmark_group("polytope");
    for (dim, n) in [(3usize, 64usize), (3, 256), (5, 64)] {
        group.bench_function(BenchmarkId::new("grow", format!("d{dim}-n{n}")), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(7);
                    (seed_simplex(dim), random_points(&mut rng, n, dim))
                },
                |(simplex, pts)| {
                    let mut hull = ConvexPolytope::new(&simplex).unwrap();
                    for p in pts {
                        let _ = hull.add_vertex(p);
                    }
                    hull
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.bench_function(BenchmarkId::new("cone_from_polytope", "d3-n256"), |b| {
        b.iter_batched(
            || grown(3, 256, 11),
            |hull| {
                let apex = Arc::new(Vertex::from_slice(&[3.0, 3.0, 3.0]));
                let _ = ComplementCone::from_polytope(apex, &hull);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_multi(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi");
    let mut rng = StdRng::seed_from_u64(3);
    let labeled: Vec<LabeledPoint> = (0..200)
        .map(|id| {
            let xs: Vec<f64> = (0..4).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let inside = |a: f64, b: f64| a * a + b * b < 1.0;
            let labels = vec![
                Label::from_sign(if inside(xs[0], xs[1]) { 1.0 } else { -1.0 }),
                Label::from_sign(if inside(xs[2], xs[3]) { 1.0 } else { -1.0 }),
            ];
            LabeledPoint::new(DataPoint::new(id, &xs), LabelGroup::new(labels).unwrap())
        })
        .collect();
    let candidates: Vec<DataPoint> = (0..1000)
        .map(|id| {
            let xs: Vec<f64> = (0..4).map(|_| rng.gen_range(-2.0..2.0)).collect();
            DataPoint::new(id, &xs)
        })
        .collect();
    let fresh = || {
        MultiTsmLearner::new(
            vec![vec![0, 1], vec![2, 3]],
            vec![GroupFlags::default(), GroupFlags::default()],
        )
        .unwrap()
    };

    group.bench_function(BenchmarkId::new("update", "2x2d-200"), |b| {
        b.iter_batched(
            fresh,
            |mut m| {
                let _ = m.update(&labeled);
                m
            },
            BatchSize::SmallInput,
        )
    });
    let mut trained = fresh();
    let _ = trained.update(&labeled);
    group.bench_function(BenchmarkId::new("predict_all", "2x2d-1000"), |b| {
        b.iter(|| trained.predict_all(&candidates))
    });
    group.finish();
}

criterion_group!(benches, bench_polytope, bench_multi);
criterion_main!(benches);
