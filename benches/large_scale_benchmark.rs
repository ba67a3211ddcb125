use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use mksort::compare_rows;
use mksort::prelude::*;
use rand::Rng;
use std::hint::black_box;
use std::time::Duration;

fn bench_1m_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("1M Rows");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(90)); // Increase time for large sort setup overhead

    // Dataset generation: (region, category, price) with skewed leading keys
    let mut rng = rand::rng();
    let count = 1_000_000;
    let table: Vec<Vec<Option<Datum>>> = (0..count)
        .map(|_| {
            vec![
                Some(Datum::from(rng.random_range(0..8i64))),
                rng.random_bool(0.9)
                    .then(|| Datum::from(format!("cat-{}", rng.random_range(0..64)))),
                Some(Datum::from(rng.random_range(0.0..1_000.0))),
            ]
        })
        .collect();
    let keys = [SortKey::asc(), SortKey::asc(), SortKey::desc()];
    let rows: Vec<usize> = (0..count).collect();

    group.throughput(Throughput::Elements(count as u64));

    // Mksort
    group.bench_function("mksort", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| mksort(black_box(&mut data), &table, &keys),
            BatchSize::LargeInput,
        )
    });

    // Std Sort Unstable
    group.bench_function("slice::sort_unstable_by", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| data.sort_unstable_by(|x, y| compare_rows(&table, &keys, x, y, 0)),
            BatchSize::LargeInput,
        )
    });

    // Std Sort (Stable)
    group.bench_function("slice::sort_by (stable)", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut data| data.sort_by(|x, y| compare_rows(&table, &keys, x, y, 0)),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_1m_rows);
criterion_main!(benches);
