//! Actor lifecycle: hooks, state tracking, and orderly shutdown.
//!
//! Shows the full `Starting -> Running -> Stopping -> Stopped` progression:
//! the host drives `on_start`/`handle`/`on_stop` around a live mailbox, while
//! the actor mirrors that progress into an [`ActorLifecycle`] it can expose
//! to callers via a query message.
//!
//! Run with `cargo run --example actor_lifecycle`.

use async_trait::async_trait;
use hearth_rt::actor::{ActorLifecycle, ActorState};
use hearth_rt::prelude::*;

#[derive(Debug, Clone)]
enum WorkerMessage {
    DoWork,
    QueryState,
}

#[derive(Debug, thiserror::Error)]
#[error("worker actor error")]
struct WorkerError;

struct Worker {
    lifecycle: ActorLifecycle,
    jobs_done: u32,
}

#[async_trait]
impl Actor for Worker {
    type Error = WorkerError;

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.lifecycle.transition_to(ActorState::Running);
        println!("{}: {:?}", ctx.handle(), self.lifecycle.state());
        Ok(())
    }

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let message: WorkerMessage = envelope
            .payload
            .downcast()
            .expect("demo only sends WorkerMessage");

        match message {
            WorkerMessage::DoWork => {
                self.jobs_done += 1;
                Ok(None)
            }
            WorkerMessage::QueryState => Ok(Some(Payload::local((
                self.lifecycle.state(),
                self.jobs_done,
            )))),
        }
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.lifecycle.transition_to(ActorState::Stopping);
        println!(
            "{}: {:?} after {} jobs",
            ctx.handle(),
            self.lifecycle.state(),
            self.jobs_done
        );
        self.lifecycle.transition_to(ActorState::Stopped);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let system = ActorSystemBuilder::new(SystemConfig::default()).build();

    let handle = system
        .create(
            || Worker {
                lifecycle: ActorLifecycle::new(),
                jobs_done: 0,
            },
            Some("worker".to_string()),
            None,
        )
        .await
        .expect("worker should start");

    for _ in 0..3 {
        system
            .send(handle, Payload::local(WorkerMessage::DoWork), None)
            .await
            .expect("work should enqueue");
    }

    let (state, jobs_done): (ActorState, u32) = system
        .call(handle, Payload::local(WorkerMessage::QueryState), None, None)
        .await
        .expect("query should answer");
    assert_eq!(state, ActorState::Running);
    assert_eq!(jobs_done, 3);
    println!("worker state: {state:?}, jobs done: {jobs_done}");

    // `kill` drives on_stop and completes the stop promise before returning.
    assert!(system.kill(handle).await);

    system.shutdown().await;
}
