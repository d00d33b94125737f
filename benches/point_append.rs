//! Measures the incremental point-append path against rebuilding the whole
//! cloud, which is the tradeoff the append path exists for.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessellar::{MarkerStyle, PointCloud, ShapeGeometry, VertexBatch};

fn seeded_cloud(count: usize) -> (PointCloud, VertexBatch) {
    let mut cloud = PointCloud::new(MarkerStyle::Square, 2.0);
    let points: Vec<f32> = (0..count * 2).map(|i| i as f32).collect();
    cloud.set_points(&points).unwrap();
    let mut batch = VertexBatch::new();
    cloud.build(&mut batch).unwrap();
    (cloud, batch)
}

fn bench_point_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_append");
    for &count in &[100usize, 1_000, 5_000] {
        group.bench_with_input(
            BenchmarkId::new("incremental", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || seeded_cloud(count),
                    |(mut cloud, mut batch)| {
                        cloud.add_point(black_box(1.5), black_box(2.5), &mut batch).unwrap();
                        batch
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
        group.bench_with_input(
            BenchmarkId::new("full_rebuild", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || seeded_cloud(count),
                    |(mut cloud, mut batch)| {
                        cloud.mark_dirty();
                        cloud.add_point(black_box(1.5), black_box(2.5), &mut batch).unwrap();
                        cloud.build(&mut batch).unwrap();
                        batch
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_point_append);
criterion_main!(benches);
