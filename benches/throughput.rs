use account_registry::{DurableBackend, RegistryService, VolatileBackend};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const ACCOUNTS: usize = 64;
const WRITES_PER_ACCOUNT: i64 = 100;

async fn seed(service: &RegistryService) {
    for i in 0..ACCOUNTS {
        service.create(&format!("acct-{i}"), 0).await.unwrap();
    }
}

/// One task per account, each overwriting its own balance sequentially.
async fn disjoint_updates(service: RegistryService) {
    let handles: Vec<_> = (0..ACCOUNTS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let name = format!("acct-{i}");
                for amount in 0..WRITES_PER_ACCOUNT {
                    service.set_amount(&name, amount).await.unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
}

fn concurrent_set_amount(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(ACCOUNTS as u64 * WRITES_PER_ACCOUNT as u64));
    group.sample_size(20);

    let rt = Runtime::new().unwrap();

    let volatile = RegistryService::new(Arc::new(VolatileBackend::new()), Duration::from_secs(5));
    rt.block_on(seed(&volatile));
    group.bench_function("volatile_disjoint_set_amount", |b| {
        b.to_async(&rt).iter(|| disjoint_updates(volatile.clone()));
    });

    let durable = RegistryService::new(
        Arc::new(DurableBackend::open_in_memory().unwrap()),
        Duration::from_secs(5),
    );
    rt.block_on(seed(&durable));
    group.bench_function("durable_disjoint_set_amount", |b| {
        b.to_async(&rt).iter(|| disjoint_updates(durable.clone()));
    });

    group.finish();
}

criterion_group!(benches, concurrent_set_amount);
criterion_main!(benches);
