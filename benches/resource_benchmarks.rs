//! Resource usage benchmarks.
//!
//! Measures baseline resource consumption:
//! - Actor spawn cost at increasing scale (1 -> 10 -> 50)
//! - Mailbox allocation cost, short-circuit vs queued in-process transport

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth_rt::mailbox::{Mailbox, MetricsEntry};
use hearth_rt::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("resource bench actor error")]
struct BenchError;

struct IdleActor {
    state: u64,
}

#[async_trait]
impl Actor for IdleActor {
    type Error = BenchError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let value: u64 = envelope.payload.downcast().unwrap_or(0);
        self.state += value;
        Ok(None)
    }
}

/// Spawn cost scaling with the number of concurrently live actors.
fn actor_population_scaling(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("actor_population_scaling");

    for actor_count in [1usize, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(actor_count),
            &actor_count,
            |b, &count| {
                b.to_async(&rt).iter(|| async move {
                    let system = ActorSystemBuilder::new(SystemConfig::default()).build();
                    let mut handles = Vec::with_capacity(count);
                    for _ in 0..count {
                        let handle = system
                            .create(|| IdleActor { state: 0 }, None, None)
                            .await
                            .unwrap();
                        handles.push(handle);
                    }
                    black_box(&handles);
                    system.shutdown().await;
                });
            },
        );
    }

    group.finish();
}

/// Mailbox allocation cost: ten fresh, unpopulated mailboxes per iteration.
fn mailbox_allocation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mailbox_allocation");

    group.bench_function("ten_mailboxes", |b| {
        b.to_async(&rt).iter(|| async {
            let mailboxes: Vec<_> = (0..10u64)
                .map(|i| {
                    let metrics = Arc::new(MetricsEntry::new(
                        Handle::new(i + 1).unwrap(),
                        None,
                        "Bench",
                    ));
                    Mailbox::new(metrics)
                })
                .collect();

            black_box(mailboxes);
        });
    });

    group.finish();
}

/// In-process transport mode comparison: short-circuit (synchronous delivery
/// on the caller's task) versus queued (single dispatch-queue reader).
fn transport_mode_comparison(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("transport_mode");

    group.bench_function("short_circuit", |b| {
        b.to_async(&rt).iter(|| async {
            let system = ActorSystemBuilder::new(SystemConfig::default()).build();
            let handle = system
                .create(|| IdleActor { state: 0 }, None, None)
                .await
                .unwrap();
            system.send(handle, Payload::local(1u64), None).await.unwrap();
            system.shutdown().await;
        });
    });

    group.bench_function("queued", |b| {
        b.to_async(&rt).iter(|| async {
            let system = ActorSystemBuilder::new(SystemConfig::default()).build_queued();
            let handle = system
                .create(|| IdleActor { state: 0 }, None, None)
                .await
                .unwrap();
            system.send(handle, Payload::local(1u64), None).await.unwrap();
            system.shutdown().await;
        });
    });

    group.finish();
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        actor_population_scaling,
        mailbox_allocation,
        transport_mode_comparison
}

criterion_main!(benches);
