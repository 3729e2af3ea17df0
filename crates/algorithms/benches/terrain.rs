//! Benchmarks for terrain algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use terrashade_algorithms::terrain::{hillshade, slope_aspect, HillshadeParams, SlopeParams};
use terrashade_core::{ElevationGrid, GeoTransform, Grid};

fn create_dem(size: usize) -> ElevationGrid {
    // planes plus a deterministic ripple
    let data = (0..size * size)
        .map(|k| {
            let (row, col) = (k / size, k % size);
            let base = (row + col) as f64;
            let variation = ((row * 7 + col * 13) % 100) as f64 / 10.0;
            base + variation
        })
        .collect();
    Grid::from_vec(data, size, size)
        .unwrap()
        .with_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0))
}

fn bench_slope_aspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("slope_aspect");

    for size in [256, 512, 1024, 2048].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| slope_aspect(black_box(&dem), SlopeParams::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_hillshade(c: &mut Criterion) {
    let mut group = c.benchmark_group("hillshade");

    for size in [256, 1024].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| hillshade(black_box(&dem), HillshadeParams::default()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_slope_aspect, bench_hillshade);
criterion_main!(benches);
