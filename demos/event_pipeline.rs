//! Event processing pipeline: three actors chained by fire-and-forget
//! `send` hops (Ingest -> Transform -> Output), each recording its own
//! step through an attached monitor.
//!
//! The runtime core does not supervise, restart, or retry;
//! a failed stage here simply reports the error to its own `on_error`
//! hook and the pipeline continues processing the next event.
//!
//! Run with: cargo run --example event_pipeline

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use hearth_rt::monitoring::{ActorEvent, ActorEventKind, InMemoryMonitor, Monitor, MonitoringConfig};
use hearth_rt::prelude::*;

#[derive(Debug, Clone)]
struct RawEvent {
    payload: String,
}

#[derive(Debug, Clone)]
struct TransformedEvent {
    payload: String,
}

#[derive(Debug, thiserror::Error)]
#[error("pipeline stage error")]
struct StageError;

async fn record(monitor: &InMemoryMonitor<ActorEvent>, handle: Handle, kind: ActorEventKind) {
    monitor
        .record(ActorEvent {
            timestamp: Utc::now(),
            handle,
            event_kind: kind,
            metadata: HashMap::new(),
        })
        .await
        .ok();
}

/// Validates and forwards raw events; drops anything empty.
struct Ingest {
    downstream: Handle,
    monitor: InMemoryMonitor<ActorEvent>,
}

#[async_trait]
impl Actor for Ingest {
    type Error = StageError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let event: RawEvent = envelope.payload.downcast().expect("demo only sends RawEvent");
        if event.payload.trim().is_empty() {
            return Err(StageError);
        }
        record(
            &self.monitor,
            ctx.handle(),
            ActorEventKind::MessageProcessed { duration_micros: 0 },
        )
        .await;
        ctx.send(self.downstream, Payload::local(event))
            .await
            .map_err(|_| StageError)?;
        Ok(None)
    }

    async fn on_error(&mut self, _error: Self::Error, ctx: &ActorContext) {
        record(
            &self.monitor,
            ctx.handle(),
            ActorEventKind::HandlerErrored {
                error: "dropped empty event".to_string(),
            },
        )
        .await;
    }
}

/// Upper-cases the payload and forwards to the output stage.
struct Transform {
    downstream: Handle,
    monitor: InMemoryMonitor<ActorEvent>,
}

#[async_trait]
impl Actor for Transform {
    type Error = StageError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let event: RawEvent = envelope.payload.downcast().expect("demo only sends RawEvent");
        let transformed = TransformedEvent {
            payload: event.payload.to_uppercase(),
        };
        record(
            &self.monitor,
            ctx.handle(),
            ActorEventKind::MessageProcessed { duration_micros: 0 },
        )
        .await;
        ctx.send(self.downstream, Payload::local(transformed))
            .await
            .map_err(|_| StageError)?;
        Ok(None)
    }
}

#[derive(Debug, Clone)]
struct CountQuery;

/// Terminal stage: accumulates processed events for inspection. Handles
/// both the `Send`-only pipeline traffic and a `Call` query for the count.
struct Output {
    received: Vec<String>,
    monitor: InMemoryMonitor<ActorEvent>,
}

#[async_trait]
impl Actor for Output {
    type Error = StageError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        if envelope.call_type == CallType::Call {
            return Ok(Some(Payload::local(self.received.len())));
        }

        let event: TransformedEvent = envelope
            .payload
            .downcast()
            .expect("demo only sends TransformedEvent on Send");
        self.received.push(event.payload.clone());
        record(
            &self.monitor,
            ctx.handle(),
            ActorEventKind::MessageProcessed { duration_micros: 0 },
        )
        .await;
        Ok(None)
    }
}

#[tokio::main]
async fn main() {
    let system = ActorSystemBuilder::new(SystemConfig::default()).build();
    let monitor = InMemoryMonitor::<ActorEvent>::new(MonitoringConfig::default());

    let output = system
        .create(
            {
                let monitor = monitor.clone();
                move || Output { received: Vec::new(), monitor }
            },
            Some("output".to_string()),
            None,
        )
        .await
        .unwrap();

    let transform = system
        .create(
            {
                let monitor = monitor.clone();
                move || Transform { downstream: output, monitor }
            },
            Some("transform".to_string()),
            None,
        )
        .await
        .unwrap();

    let ingest = system
        .create(
            {
                let monitor = monitor.clone();
                move || Ingest { downstream: transform, monitor }
            },
            Some("ingest".to_string()),
            None,
        )
        .await
        .unwrap();

    for payload in ["hello", "", "pipeline", "world"] {
        system
            .send(ingest, Payload::local(RawEvent { payload: payload.to_string() }), None)
            .await
            .unwrap();
    }

    // Give the fire-and-forget hops a moment to drain through all three
    // stages before reading the result.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let count: usize = system
        .call(output, Payload::local(CountQuery), None, None)
        .await
        .unwrap_or(0);
    println!("output stage received {count} events (one empty event was dropped at ingest)");

    let snapshot = monitor.snapshot().await.unwrap();
    println!(
        "pipeline monitor: {} processed, {} errors",
        snapshot.info_count + snapshot.trace_count,
        snapshot.error_count
    );

    system.shutdown().await;
}
