use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pack_allocator::{AllocationStrategy, PackCatalog, Strategy};

fn bench_allocate(c: &mut Criterion) {
    let standard = PackCatalog::new([250, 500, 1000, 2000, 5000]).unwrap();
    let coprime = PackCatalog::new([23, 31, 53]).unwrap();
    let cases = [
        ("extra_small", 250u64, &standard),
        ("small", 12_001, &standard),
        ("medium", 100_000, &coprime),
        ("large", 500_000, &coprime),
        ("extra_large", 10_000_000, &standard),
    ];

    let mut group = c.benchmark_group("allocate");
    group.sample_size(10);
    for strategy in Strategy::ALL {
        for (name, order, catalog) in &cases {
            // The frontier search holds every visited total in memory.
            if strategy == Strategy::ShortestPath && *order > 1_000_000 {
                continue;
            }
            group.bench_with_input(
                BenchmarkId::new(strategy.as_str(), name),
                order,
                |b, &order| b.iter(|| strategy.solve(black_box(order), catalog).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_allocate);
criterion_main!(benches);
