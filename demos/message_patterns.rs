//! Message passing patterns: `Send` vs `Call`, `Arc<T>` payloads for
//! cheap fan-out, inter-actor forwarding, and call timeouts.
//!
//! Run with `cargo run --example message_patterns`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hearth_rt::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("pattern demo actor error")]
struct DemoError;

/// Fire-and-forget: a logger actor that never answers.
struct Logger;

#[async_trait]
impl Actor for Logger {
    type Error = DemoError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let line: Arc<String> = envelope
            .payload
            .downcast()
            .expect("demo only sends Arc<String>");
        println!("log: {line}");
        Ok(None)
    }
}

/// Request-response: doubles a number.
struct Doubler;

#[async_trait]
impl Actor for Doubler {
    type Error = DemoError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let n: i64 = envelope.payload.downcast().expect("demo only sends i64");
        Ok(Some(Payload::local(n * 2)))
    }
}

/// Forwards a query to `Doubler` and relays the answer back — showing how
/// one actor calls another through its own [`ActorContext`].
struct Relay {
    doubler: Handle,
}

#[async_trait]
impl Actor for Relay {
    type Error = DemoError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let n: i64 = envelope.payload.downcast().expect("demo only sends i64");
        let doubled = ctx
            .call(self.doubler, Payload::local(n), Some(Duration::from_secs(1)))
            .await
            .map_err(|_| DemoError)?;
        Ok(Some(doubled))
    }
}

/// Never answers — used to demonstrate a call timeout.
struct BlackHole;

#[async_trait]
impl Actor for BlackHole {
    type Error = DemoError;

    async fn handle(
        &mut self,
        _envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(Some(Payload::local(())))
    }
}

#[tokio::main]
async fn main() {
    let system = ActorSystemBuilder::new(SystemConfig::default()).build();

    // Send: fire-and-forget, no response promise.
    let logger = system.create(|| Logger, None, None).await.unwrap();
    system
        .send(logger, Payload::local(Arc::new("startup complete".to_string())), None)
        .await
        .unwrap();

    // Call: request-response.
    let doubler = system.create(|| Doubler, None, None).await.unwrap();
    let doubled: i64 = system
        .call(doubler, Payload::local(21i64), None, None)
        .await
        .unwrap();
    println!("doubled: {doubled}");
    assert_eq!(doubled, 42);

    // Relay: one actor calling another via its own context.
    let relay = system
        .create(move || Relay { doubler }, None, None)
        .await
        .unwrap();
    let relayed: i64 = system
        .call(relay, Payload::local(10i64), None, None)
        .await
        .unwrap();
    println!("relayed doubled: {relayed}");
    assert_eq!(relayed, 20);

    // Timeout: a caller-supplied timeout completes the call promise with
    // cancellation rather than waiting on an unresponsive handler.
    let black_hole = system.create(|| BlackHole, None, None).await.unwrap();
    let timed_out: Result<(), SystemError> = system
        .call(
            black_hole,
            Payload::local(()),
            Some(Duration::from_millis(50)),
            None,
        )
        .await;
    assert!(matches!(timed_out, Err(SystemError::CallTimeout(_))));
    println!("call timed out as expected: {timed_out:?}");

    system.shutdown().await;
}
