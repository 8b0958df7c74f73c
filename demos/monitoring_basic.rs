//! Basic monitoring: wiring an [`InMemoryMonitor`] alongside a running
//! actor system, recording lifecycle events, and reading snapshots.
//!
//! The runtime core never wires a monitor in for you — it is an
//! operator-facing collaborator. This shows the pattern an
//! application would follow: record events from actor hooks, query
//! snapshots from anywhere that holds a clone of the monitor.
//!
//! Run with: cargo run --example monitoring_basic

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use hearth_rt::monitoring::{
    ActorEvent, ActorEventKind, EventSeverity, InMemoryMonitor, Monitor, MonitoringConfig,
};
use hearth_rt::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("monitored actor error")]
struct MonitoredError;

struct MonitoredActor {
    monitor: InMemoryMonitor<ActorEvent>,
}

#[async_trait]
impl Actor for MonitoredActor {
    type Error = MonitoredError;

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.monitor
            .record(ActorEvent {
                timestamp: Utc::now(),
                handle: ctx.handle(),
                event_kind: ActorEventKind::Started,
                metadata: HashMap::new(),
            })
            .await
            .ok();
        Ok(())
    }

    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let started = std::time::Instant::now();
        let n: i64 = envelope.payload.downcast().unwrap_or_default();
        let result = n * n;

        self.monitor
            .record(ActorEvent {
                timestamp: Utc::now(),
                handle: ctx.handle(),
                event_kind: ActorEventKind::MessageProcessed {
                    duration_micros: started.elapsed().as_micros() as u64,
                },
                metadata: HashMap::new(),
            })
            .await
            .ok();

        Ok(Some(Payload::local(result)))
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.monitor
            .record(ActorEvent {
                timestamp: Utc::now(),
                handle: ctx.handle(),
                event_kind: ActorEventKind::Killed,
                metadata: HashMap::new(),
            })
            .await
            .ok();
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let monitor = InMemoryMonitor::<ActorEvent>::new(MonitoringConfig {
        max_history_size: 100,
        severity_filter: EventSeverity::Trace,
        ..MonitoringConfig::default()
    });

    let system = ActorSystemBuilder::new(SystemConfig::default()).build();
    let handle = system
        .create(
            {
                let monitor = monitor.clone();
                move || MonitoredActor { monitor }
            },
            Some("squarer".to_string()),
            None,
        )
        .await
        .expect("actor should start");

    for n in 1..=5 {
        let squared: i64 = system
            .call(handle, Payload::local(n as i64), None, None)
            .await
            .expect("call should answer");
        println!("{n}^2 = {squared}");
    }

    // The runtime's own metrics registry tracks queue depth and processed
    // counts independently of any attached monitor; the two are
    // complementary, not redundant. Read it before `kill` removes the entry.
    if let Some(metrics) = system.metrics().try_snapshot(handle) {
        println!(
            "mailbox metrics: processed={} exceptions={}",
            metrics.processed_count, metrics.exception_count
        );
    }

    system.kill(handle).await;

    let snapshot = monitor.snapshot().await.expect("snapshot should succeed");
    println!(
        "recorded {} events ({} info, {} trace)",
        snapshot.total_events, snapshot.info_count, snapshot.trace_count
    );
    for event in &snapshot.recent_events {
        println!("  {:?} on {}", event.event_kind, event.handle);
    }

    system.shutdown().await;
}
