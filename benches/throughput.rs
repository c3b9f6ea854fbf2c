use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use pointlog::accrual::{AccrualConfig, AccrualEngine, ChatActivity};

const T0: u64 = 1_700_000_000_000;

fn bench_record_activity(c: &mut Criterion) {
    c.bench_function("record_activity_50k", |b| {
        b.iter(|| {
            let mut engine = AccrualEngine::new(AccrualConfig::default());
            for i in 0..50_000u64 {
                let _ = engine.record_activity(&ChatActivity {
                    user_id: i % 500,
                    content_len: 40,
                    ts_ms: T0 + i * 1_000,
                });
            }
        });
    });
}

fn bench_epoch_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("epoch_cycle");

    for users in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(users), &users, |b, &users| {
            b.iter(|| {
                let mut engine = AccrualEngine::new(AccrualConfig::default());
                for round in 0..10u64 {
                    for user in 0..users {
                        let _ = engine.record_activity(&ChatActivity {
                            user_id: user,
                            content_len: 40,
                            ts_ms: T0 + round * 30_000,
                        });
                    }
                }
                for user in 0..users {
                    let _ = engine.flush(user);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record_activity, bench_epoch_cycle);
criterion_main!(benches);
