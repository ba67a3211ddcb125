use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use mksort::compare_rows;
use mksort::prelude::*;
use rand::Rng;
use std::hint::black_box;

fn random_table(count: usize, cardinality: i64) -> Vec<Vec<Option<i64>>> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            (0..3)
                .map(|_| {
                    rng.random_bool(0.95)
                        .then(|| rng.random_range(0..cardinality))
                })
                .collect()
        })
        .collect()
}

fn bench_composite_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("Composite Keys");
    group.sample_size(10);

    // Dataset generation
    let count = 10_000;
    let table = random_table(count, 1_000);
    let keys = [SortKey::asc(), SortKey::desc(), SortKey::asc()];
    let rows: Vec<usize> = (0..count).collect();

    // Mksort
    group.bench_function("mksort", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| mksort(black_box(&mut data), &table, &keys),
            BatchSize::SmallInput,
        )
    });

    // Std Sort Unstable on the full composite comparator
    group.bench_function("slice::sort_unstable_by", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| data.sort_unstable_by(|x, y| compare_rows(&table, &keys, x, y, 0)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_low_cardinality(c: &mut Criterion) {
    let mut group = c.benchmark_group("Low Cardinality Leading Keys");
    group.sample_size(10);

    // Many ties on the first columns, where depth-wise partitioning pays off
    let count = 10_000;
    let table = random_table(count, 4);
    let keys = [SortKey::asc(), SortKey::asc(), SortKey::asc()];
    let rows: Vec<usize> = (0..count).collect();

    group.bench_function("mksort", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| mksort(black_box(&mut data), &table, &keys),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("slice::sort_unstable_by", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| data.sort_unstable_by(|x, y| compare_rows(&table, &keys, x, y, 0)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_composite_keys, bench_low_cardinality);
criterion_main!(benches);
