//! Benchmark for PersistentHashMap vs standard HashMap.
//!
//! Compares single-key persistent operations, bulk combinators and
//! iteration against `std::collections::HashMap`.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use persistent_hamt::persistent::{Edit, PersistentHashMap};
use std::collections::HashMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentHashMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = HashMap::new();
                    for index in 0..size {
                        map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index * 2)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index * 2)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = persistent_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = standard_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("remove");

    for size in [1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap_single", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| black_box(persistent_map.remove(&black_box(size / 2))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap_all", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = persistent_map.clone();
                    for key in 0..size {
                        map = map.remove(&black_box(key));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap_remove_many", size),
            &size,
            |bencher, &size| {
                let keys: Vec<i32> = (0..size).collect();
                bencher.iter(|| black_box(persistent_map.remove_many(black_box(&keys))));
            },
        );
    }

    group.finish();
}

// =============================================================================
// update Benchmark
// =============================================================================

fn benchmark_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("update");

    let size = 10_000;
    let persistent_map: PersistentHashMap<i32, i32> =
        (0..size).map(|index| (index, index)).collect();

    group.bench_function("update_with_increment", |bencher| {
        bencher.iter(|| {
            black_box(persistent_map.update_with(&black_box(size / 3), |value| {
                value.map(|value| value + 1)
            }))
        });
    });

    group.bench_function("alter_keep", |bencher| {
        bencher.iter(|| black_box(persistent_map.alter(&black_box(size / 3), |_| Edit::Keep)));
    });

    group.finish();
}

// =============================================================================
// merge Benchmark
// =============================================================================

fn benchmark_merge(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("merge");

    for size in [1_000, 10_000] {
        let left: PersistentHashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();
        let right: PersistentHashMap<i32, i32> =
            (size / 2..size + size / 2).map(|index| (index, -index)).collect();

        group.bench_with_input(
            BenchmarkId::new("merge", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(left.merge(black_box(&right))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("merge_with", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    black_box(left.merge_with(black_box(&right), |_, first, second| first + second))
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in [1_000, 100_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let sum: i64 = persistent_map.iter().map(|(_, &value)| i64::from(value)).sum();
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap_fold", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    black_box(persistent_map.fold(0_i64, |sum, _, &value| sum + i64::from(value)))
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let sum: i64 = standard_map.values().map(|&value| i64::from(value)).sum();
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_filter_map_values(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("combinators");

    let persistent_map: PersistentHashMap<i32, i32> =
        (0..10_000).map(|index| (index, index)).collect();

    group.bench_function("filter_even", |bencher| {
        bencher.iter(|| black_box(persistent_map.filter(|value| value % 2 == 0)));
    });

    group.bench_function("map_values_double", |bencher| {
        bencher.iter(|| black_box(persistent_map.map_values(|value| value * 2)));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_update,
    benchmark_merge,
    benchmark_iteration,
    benchmark_filter_map_values
);

criterion_main!(benches);
