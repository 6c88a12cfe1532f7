use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use eggs_production::{EggProductionRecord, EggProductionService, InMemoryEggProductionStore};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

fn sample_record(i: i32) -> EggProductionRecord {
    EggProductionRecord {
        quantity_eggs: Some(100 + i),
        eggs_per_kilo: Some(20),
        price_kilo: Some(Decimal::new(350, 2)),
        registration_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Default::default()
    }
}

async fn seeded_service(n: i32) -> EggProductionService<InMemoryEggProductionStore> {
    let service = EggProductionService::new(InMemoryEggProductionStore::new());
    for i in 0..n {
        let created = service.create(sample_record(i)).await.unwrap();
        if i % 2 == 0 {
            service.inactivate(created.id.unwrap()).await.unwrap();
        }
    }
    service
}

fn bench_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = EggProductionService::new(InMemoryEggProductionStore::new());

    c.bench_function("create_record", |b| {
        b.iter(|| {
            rt.block_on(service.create(black_box(sample_record(1))))
                .unwrap()
        })
    });
}

fn bench_list_active(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("list_active");

    for size in [100, 1_000, 10_000] {
        let service = rt.block_on(seeded_service(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| rt.block_on(service.list_active()).unwrap())
        });
    }

    group.finish();
}

fn bench_status_toggle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = rt.block_on(seeded_service(1_000));
    let id = rt
        .block_on(service.create(sample_record(0)))
        .unwrap()
        .id
        .unwrap();

    c.bench_function("inactivate_then_activate", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.inactivate(black_box(id)).await.unwrap();
                service.activate(black_box(id)).await.unwrap();
            })
        })
    });
}

criterion_group!(benches, bench_create, bench_list_active, bench_status_toggle);
criterion_main!(benches);
