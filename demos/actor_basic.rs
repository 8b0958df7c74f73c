//! Basic actor fundamentals: state, `Send` vs `Call`, and error recovery.
//!
//! A `Counter` actor holds private state and answers three message shapes:
//! increment (fire-and-forget), query (request-response), and a deliberate
//! fault to show that a handler error never stops the mailbox pump.
//!
//! Run with `cargo run --example actor_basic`.

use async_trait::async_trait;
use hearth_rt::prelude::*;

#[derive(Debug, Clone)]
enum CounterMessage {
    Increment(i64),
    Query,
    Fail,
}

#[derive(Debug, thiserror::Error)]
enum CounterError {
    #[error("counter actor asked to fail")]
    Requested,
}

struct Counter {
    value: i64,
}

#[async_trait]
impl Actor for Counter {
    type Error = CounterError;

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("counter {} starting at {}", ctx.handle(), self.value);
        Ok(())
    }

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let message: CounterMessage = envelope
            .payload
            .downcast()
            .expect("demo only sends CounterMessage");

        match message {
            CounterMessage::Increment(delta) => {
                self.value += delta;
                match envelope.call_type {
                    CallType::Call => Ok(Some(Payload::local(self.value))),
                    CallType::Send => Ok(None),
                }
            }
            CounterMessage::Query => Ok(Some(Payload::local(self.value))),
            CounterMessage::Fail => Err(CounterError::Requested),
        }
    }

    async fn on_error(&mut self, error: Self::Error, ctx: &ActorContext) {
        eprintln!("counter {} handler errored: {error}", ctx.handle());
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("counter {} stopping at {}", ctx.handle(), self.value);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let system = ActorSystemBuilder::new(SystemConfig::default()).build();

    let handle = system
        .create(|| Counter { value: 0 }, Some("counter".to_string()), None)
        .await
        .expect("counter should start");

    system
        .send(handle, Payload::local(CounterMessage::Increment(5)), None)
        .await
        .expect("increment should be accepted");

    let value: i64 = system
        .call(handle, Payload::local(CounterMessage::Query), None, None)
        .await
        .expect("query should answer");
    assert_eq!(value, 5);
    println!("counter value after increment: {value}");

    // A handler error faults this one call but leaves the actor running.
    let faulted: Result<i64, SystemError> = system
        .call(handle, Payload::local(CounterMessage::Fail), None, None)
        .await;
    assert!(faulted.is_err());

    let value_after_fault: i64 = system
        .call(handle, Payload::local(CounterMessage::Query), None, None)
        .await
        .expect("counter survives the previous fault");
    assert_eq!(value_after_fault, 5);
    println!("counter value after fault: {value_after_fault}");

    system.shutdown().await;
}
