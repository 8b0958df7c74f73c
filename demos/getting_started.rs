//! Getting started: spawn one actor, call it, shut the system down.
//!
//! Run with `cargo run --example getting_started`.

use async_trait::async_trait;
use hearth_rt::prelude::*;

struct Greeter;

#[derive(Debug, thiserror::Error)]
#[error("greeter actor error")]
struct GreeterError;

#[async_trait]
impl Actor for Greeter {
    type Error = GreeterError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        match envelope.call_type {
            CallType::Call => {
                let name: String = envelope.payload.downcast().unwrap_or_default();
                Ok(Some(Payload::local(format!("hello, {name}"))))
            }
            CallType::Send => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let system = ActorSystemBuilder::new(SystemConfig::default()).build();

    let handle = system
        .create(|| Greeter, Some("greeter".to_string()), None)
        .await
        .expect("greeter should start");

    let reply: String = system
        .call(handle, Payload::local("world".to_string()), None, None)
        .await
        .expect("greeter should answer");
    println!("{reply}");

    system.shutdown().await;
}
