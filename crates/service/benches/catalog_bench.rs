use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::domain::ProductDraft;
use service::file::product_store::ProductStore;
use service::notify::NoopNotifier;
use service::storage::{backend::MemoryByteStore, json_persistence::JsonPersistence};

fn draft(code: String) -> ProductDraft {
    ProductDraft {
        title: Some("Bench".into()),
        description: Some("bench product".into()),
        price: Some(9.99),
        thumbnail: Some("bench.png".into()),
        code: Some(code),
        stock: Some(10),
    }
}

fn bench_create(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let persistence = JsonPersistence::new(Arc::new(MemoryByteStore::new()));
    let store = rt.block_on(ProductStore::open(&persistence, "bench_products", Arc::new(NoopNotifier)));
    let mut n: u64 = 0;

    c.bench_function("catalog_create_write_through", |b| {
        b.iter(|| {
            n += 1;
            black_box(rt.block_on(store.create(draft(format!("B{n}")))).unwrap());
        });
    });

    rt.block_on(store.flush());
}

criterion_group!(benches, bench_create);
criterion_main!(benches);
