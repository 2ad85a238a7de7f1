//! Store operation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tessera_bench::utils::{generate_owners, generate_people};
use tessera_core::{Condition, Order, Query, Store};
use tessera_testkit::{Dog, Person, PersonKey, TestStore};

/// Benchmark batch saves of keyless records.
fn bench_save_people(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_people");

    for batch_size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let store = Store::in_memory();
                let people = generate_people(batch_size);

                b.iter(|| {
                    store.save_all(black_box(&people)).unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Benchmark upserting owners with enclosed dogs.
fn bench_save_owners(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_owners");

    for dogs in [0, 5, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(dogs), dogs, |b, &dogs| {
            let store = Store::in_memory();
            let owners = generate_owners(50, dogs);

            b.iter(|| {
                store.save_all(black_box(&owners)).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark file-backed saves, where each save commits to disk.
fn bench_save_file(c: &mut Criterion) {
    let test_store = TestStore::file();
    let people = generate_people(100);

    c.bench_function("save_file_100", |b| {
        b.iter(|| {
            test_store.save_all(black_box(&people)).unwrap();
        });
    });
}

/// Benchmark filtered, ordered and paginated reads.
fn bench_fetch(c: &mut Criterion) {
    let store = Store::in_memory();
    store.save_all(&generate_people(10_000)).unwrap();

    let mut group = c.benchmark_group("fetch");

    let filtered = Query::new()
        .filter(Condition::equal(PersonKey::FirstName, "Jack"))
        .and_filter(Condition::like(PersonKey::LastName, "Wh%"));
    group.bench_function("filtered", |b| {
        b.iter(|| store.fetch::<Person>(black_box(&filtered)).unwrap());
    });

    let page = Query::new()
        .order_by(Order::Ascending(vec![PersonKey::LastName, PersonKey::FirstName]))
        .offset(5_000)
        .limit(100);
    group.bench_function("page", |b| {
        b.iter(|| store.fetch::<Person>(black_box(&page)).unwrap());
    });

    group.bench_function("count", |b| {
        b.iter(|| store.count::<Person>(black_box(&filtered)).unwrap());
    });

    group.finish();
}

/// Benchmark loading owners together with their dogs.
fn bench_fetch_related(c: &mut Criterion) {
    let store = Store::in_memory();
    store.save_all(&generate_owners(100, 5)).unwrap();

    c.bench_function("fetch_owners_with_dogs", |b| {
        b.iter(|| {
            let owners = store.fetch::<tessera_testkit::Owner>(&Query::new()).unwrap();
            black_box(owners)
        });
    });

    c.bench_function("count_dogs", |b| {
        b.iter(|| store.count::<Dog>(&Query::new()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_save_people,
    bench_save_owners,
    bench_save_file,
    bench_fetch,
    bench_fetch_related,
);
criterion_main!(benches);
