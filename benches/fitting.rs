//! Local fitting benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Neighborhood size (50 to 5K samples per fit)
//! - Primitive fits (plane, line, oriented/unoriented/Pratt sphere, Monge)
//! - Extensions (GLS descriptors, derivatives, curvature estimators)
//! - Weight kernels (smooth, Wendland, compact exponential)
//! - Batch fitting over query sets (sequential and parallel)
//!
//! Run with: `cargo bench` (add `--features parallel` for the parallel batch)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector3;
use pointfit_rs::prelude::*;
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use std::f64::consts::PI;
use std::hint::black_box;

type Point = PointPositionNormal<f64, 3>;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Unit-sphere samples with Gaussian position and normal noise.
fn generate_sphere_data(size: usize, noise: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise_dist = Normal::new(0.0, noise).unwrap();
    let cos_dist = Uniform::new(-1.0, 1.0).unwrap();
    let phi_dist = Uniform::new(0.0, 2.0 * PI).unwrap();

    (0..size)
        .map(|_| {
            let z: f64 = cos_dist.sample(&mut rng);
            let phi: f64 = phi_dist.sample(&mut rng);
            let r = (1.0 - z * z).sqrt();
            let n = Vector3::new(r * phi.cos(), r * phi.sin(), z);
            let jitter = Vector3::from_fn(|_, _| noise_dist.sample(&mut rng));
            PointPositionNormal::new(n + jitter, (n + jitter * 0.5).normalize())
        })
        .collect()
}

/// Saddle height field `z = x² - y²` on `[-1, 1]²` with noisy heights.
fn generate_saddle_data(size: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let coord_dist = Uniform::new(-1.0, 1.0).unwrap();
    let noise_dist = Normal::new(0.0, 0.01).unwrap();

    (0..size)
        .map(|_| {
            let x: f64 = coord_dist.sample(&mut rng);
            let y: f64 = coord_dist.sample(&mut rng);
            let z = x * x - y * y + noise_dist.sample(&mut rng);
            let n = Vector3::new(-2.0 * x, 2.0 * y, 1.0).normalize();
            PointPositionNormal::new(Vector3::new(x, y, z), n)
        })
        .collect()
}

/// Random query points on the unit sphere.
fn generate_queries(count: usize, seed: u64) -> Vec<Vector3<f64>> {
    generate_sphere_data(count, 0.0, seed).into_iter().map(|p| p.pos).collect()
}

/// Samples within `radius` of `center`, as a spatial index would return them.
fn neighborhood(points: &[Point], center: &Vector3<f64>, radius: f64) -> Vec<Point> {
    points
        .iter()
        .filter(|p| (p.pos - center).norm() < radius)
        .copied()
        .collect()
}

fn builder(center: Vector3<f64>, scale: f64) -> FitBuilder<f64, 3> {
    FitBuilder::new().center(center).scale(scale)
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_neighborhood_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhood_size");
    group.sample_size(50);

    let pole = Vector3::new(0.0, 0.0, 1.0);
    for size in [50, 500, 5_000] {
        // About `size` samples inside a cap of radius 0.5.
        let points = generate_sphere_data(size * 16, 0.01, 42);
        let local = neighborhood(&points, &pole, 0.5);
        group.throughput(Throughput::Elements(local.len() as u64));

        group.bench_with_input(BenchmarkId::new("oriented_sphere", size), &local, |b, local| {
            b.iter(|| {
                let mut fit = builder(pole, 0.5).build::<OrientedSphereFit<f64, 3>>().unwrap();
                fit.compute(black_box(local))
            })
        });
    }
    group.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    group.sample_size(100);

    let pole = Vector3::new(0.0, 0.0, 1.0);
    let points = generate_sphere_data(20_000, 0.01, 42);
    let local = neighborhood(&points, &pole, 0.5);
    let positions: Vec<Vector3<f64>> = local.iter().map(|p| p.pos).collect();

    group.bench_function("covariance_plane", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5).build::<CovariancePlaneFit<f64, 3>>().unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("covariance_line", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5).build::<CovarianceLineFit>().unwrap();
            fit.compute(black_box(&positions))
        })
    });
    group.bench_function("oriented_sphere", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5).build::<OrientedSphereFit<f64, 3>>().unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("unoriented_sphere", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5).build::<UnorientedSphereFit<f64, 3>>().unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("pratt_sphere", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5).build::<SphereFit<f64, 3>>().unwrap();
            fit.compute(black_box(&positions))
        })
    });
    group.bench_function("monge_patch", |b| {
        b.iter(|| {
            let mut fit = builder(pole, 0.5)
                .build::<(CovariancePlaneFit<f64, 3>, MongeFit<f64, 3>)>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.finish();
}

fn bench_extensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("extensions");
    group.sample_size(100);

    let origin = Vector3::new(0.0, 0.0, 0.0);
    let points = generate_saddle_data(20_000, 7);
    let local = neighborhood(&points, &origin, 0.4);

    group.bench_function("gls", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<(OrientedSphereFit<f64, 3>, GlsParam)>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("gls_scale_derivatives", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<(OrientedSphereDer<f64, 3, ScaleDer>, GlsParam, GlsDer)>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("plane_derivatives", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<CovariancePlaneDer<f64, 3, ScaleSpaceDer>>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("curvature_normal_derivatives", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<(OrientedSphereDer<f64, 3, SpaceDer>, NormalDerivativesCurvature)>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("curvature_normal_covariance", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<NormalCovarianceCurvature<f64, 3>>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.bench_function("curvature_projected_normal_covariance", |b| {
        b.iter(|| {
            let mut fit = builder(origin, 0.4)
                .build::<(CovariancePlaneFit<f64, 3>, ProjectedNormalCovarianceCurvature<f64, 3>)>()
                .unwrap();
            fit.compute(black_box(&local))
        })
    });
    group.finish();
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");
    group.sample_size(100);

    let pole = Vector3::new(0.0, 0.0, 1.0);
    let points = generate_sphere_data(20_000, 0.01, 42);
    let local = neighborhood(&points, &pole, 0.5);

    let kernels = [
        ("smooth", WeightKernel::Smooth),
        ("wendland", WeightKernel::Wendland),
        ("compact_exp", WeightKernel::CompactExp),
    ];
    for (name, kernel) in kernels {
        group.bench_with_input(BenchmarkId::new("sphere_derivatives", name), &kernel, |b, &kernel| {
            b.iter(|| {
                let mut fit = builder(pole, 0.5)
                    .kernel(kernel)
                    .build::<OrientedSphereDer<f64, 3, ScaleSpaceDer>>()
                    .unwrap();
                fit.compute(black_box(&local))
            })
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    let points = generate_sphere_data(50_000, 0.01, 42);
    let queries = generate_queries(1_000, 3);
    // Bucket grid standing in for a spatial index.
    let cell = 0.1;
    let key = |p: &Vector3<f64>| {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };
    let mut grid: std::collections::HashMap<(i64, i64, i64), Vec<usize>> = Default::default();
    for (i, p) in points.iter().enumerate() {
        grid.entry(key(&p.pos)).or_default().push(i);
    }
    let neighbors = |q: &Vector3<f64>| {
        let (x, y, z) = key(q);
        let mut ids = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = grid.get(&(x + dx, y + dy, z + dz)) {
                        ids.extend(bucket.iter().copied().filter(|&i| (points[i].pos - q).norm() < cell));
                    }
                }
            }
        }
        ids
    };

    group.throughput(Throughput::Elements(queries.len() as u64));
    for parallel in [false, true] {
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| {
                BatchFitter::new()
                    .scale(cell)
                    .parallel(parallel)
                    .fit_all::<(OrientedSphereFit<f64, 3>, GlsParam), _, _>(
                        black_box(&queries),
                        &points,
                        &neighbors,
                    )
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_neighborhood_size,
    bench_primitives,
    bench_extensions,
    bench_kernels,
    bench_batch,
);

criterion_main!(benches);
