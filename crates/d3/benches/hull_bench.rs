//! Benchmarks for hull construction and packing.
//!
//! Measures hull building on random clouds and incremental packing of
//! mixed boxes at various scales.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stowage_d3::{ConvexHull, PackedObject, Packer, ShapeMetric};

fn cloud(n: usize) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(n as u64);
    (0..n)
        .map(|_| {
            Point3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        })
        .collect()
}

fn bench_hull_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex_hull");

    for &n in &[100, 1_000, 10_000] {
        let points = cloud(n);
        group.bench_with_input(BenchmarkId::new("random_cube", n), &points, |b, p| {
            b.iter(|| {
                let hull = ConvexHull::build(black_box(p));
                black_box(hull)
            })
        });
    }
    group.finish();
}

fn bench_packer(c: &mut Criterion) {
    let mut group = c.benchmark_group("packer");
    group.sample_size(10);

    for &n in &[10, 50, 100] {
        let mut rng = StdRng::seed_from_u64(7);
        let boxes: Vec<PackedObject<usize>> = (0..n)
            .map(|i| {
                let size = Vector3::new(
                    rng.gen_range(1.0..5.0),
                    rng.gen_range(1.0..5.0),
                    rng.gen_range(1.0..5.0),
                );
                PackedObject::new(i, size)
            })
            .collect();
        let container = ShapeMetric::from_box(Point3::origin(), Vector3::new(20.0, 20.0, 20.0));

        group.bench_with_input(BenchmarkId::new("try_add", n), &boxes, |b, boxes| {
            b.iter(|| {
                let mut packer = Packer::new(container.clone());
                for obj in boxes {
                    let _ = packer.try_add(obj.clone());
                }
                black_box(packer.total_volume())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hull_build, bench_packer);
criterion_main!(benches);
