//! Constraint evaluation performance benchmarks
//!
//! Benchmarks constraint parsing and version matching for the clause shapes
//! found in registry metadata.

use astrix_core::types::{satisfies, Version, VersionConstraint};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::str::FromStr;

const CONSTRAINTS: [&str; 5] = [
    "==2.25.1",
    ">=1.21.1, <3",
    "~=1.4.2",
    "!=1.5.7,>=1.5.6",
    "==3.*",
];

fn create_version_list(count: usize) -> Vec<Version> {
    (0..count)
        .map(|i| Version::new(vec![(i / 100) as u64, ((i / 10) % 10) as u64, (i % 10) as u64]))
        .collect()
}

/// Benchmark parsing of constraint strings
fn bench_constraint_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint_parsing");

    for constraint in CONSTRAINTS.iter() {
        group.bench_with_input(
            BenchmarkId::new("parse", constraint),
            constraint,
            |b, constraint| b.iter(|| black_box(VersionConstraint::parse(constraint))),
        );
    }

    group.finish();
}

/// Benchmark matching pre-parsed constraints against many versions
fn bench_version_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_matching");
    let constraints: Vec<VersionConstraint> = CONSTRAINTS
        .iter()
        .filter_map(|c| VersionConstraint::from_str(c).ok())
        .collect();

    for version_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*version_count as u64));
        let versions = create_version_list(*version_count);

        group.bench_with_input(
            BenchmarkId::new("versions", version_count),
            &versions,
            |b, versions| {
                b.iter(|| {
                    versions
                        .iter()
                        .filter(|v| constraints.iter().all(|c| c.matches(v)))
                        .count()
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the string-level entry point used by the detector
fn bench_satisfies(c: &mut Criterion) {
    c.bench_function("satisfies_string", |b| {
        b.iter(|| black_box(satisfies(black_box("2.25.1"), black_box(">=2.0, <3"))))
    });
}

criterion_group!(
    benches,
    bench_constraint_parsing,
    bench_version_matching,
    bench_satisfies
);
criterion_main!(benches);
