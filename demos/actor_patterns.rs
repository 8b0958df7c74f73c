//! Actor development patterns: unique services, command/query separation,
//! and a circuit-breaker style error boundary.
//!
//! Run with `cargo run --example actor_patterns`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hearth_rt::prelude::*;

// ---------------------------------------------------------------------
// Command / query separation
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
enum AccountMessage {
    Deposit(i64),
    Withdraw(i64),
    Balance,
}

#[derive(Debug, thiserror::Error)]
enum AccountError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
}

struct Account {
    balance: i64,
}

#[async_trait]
impl Actor for Account {
    type Error = AccountError;

    async fn handle(
        &mut self,
        envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let message: AccountMessage = envelope
            .payload
            .downcast()
            .expect("demo only sends AccountMessage");

        match message {
            AccountMessage::Deposit(amount) => {
                self.balance += amount;
                Ok(None)
            }
            AccountMessage::Withdraw(amount) => {
                if amount > self.balance {
                    return Err(AccountError::InsufficientFunds {
                        balance: self.balance,
                        requested: amount,
                    });
                }
                self.balance -= amount;
                Ok(None)
            }
            AccountMessage::Balance => Ok(Some(Payload::local(self.balance))),
        }
    }
}

// ---------------------------------------------------------------------
// Circuit-breaker style error boundary: the actor tracks its own
// consecutive-failure count and refuses new calls once tripped, rather
// than relying on the runtime (which never restarts or escalates on its own).
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FlakyCall;

#[derive(Debug, thiserror::Error)]
enum BreakerError {
    #[error("breaker open after {0} consecutive failures")]
    Open(u32),
    #[error("downstream call failed")]
    Downstream,
}

struct CircuitBreaker {
    failures: Arc<AtomicU32>,
    trip_after: u32,
    attempt: u32,
}

#[async_trait]
impl Actor for CircuitBreaker {
    type Error = BreakerError;

    async fn handle(
        &mut self,
        _envelope: Envelope,
        _ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error> {
        let current = self.failures.load(Ordering::SeqCst);
        if current >= self.trip_after {
            return Err(BreakerError::Open(current));
        }

        self.attempt += 1;
        // Odd attempts simulate a downstream failure.
        if self.attempt % 2 == 1 {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(BreakerError::Downstream);
        }
        self.failures.store(0, Ordering::SeqCst);
        Ok(Some(Payload::local(())))
    }
}

#[tokio::main]
async fn main() {
    let system = ActorSystemBuilder::new(SystemConfig::default()).build();

    // Unique-service pattern: two callers racing for the same name settle
    // on one actor instance.
    let a = system
        .get_or_create_unique("ledger", || Account { balance: 0 })
        .await
        .expect("first caller creates the actor");
    let b = system
        .get_or_create_unique("ledger", || Account { balance: 1000 })
        .await
        .expect("second caller observes the same actor");
    assert_eq!(a.handle, b.handle);

    system
        .send(a.handle, Payload::local(AccountMessage::Deposit(50)), None)
        .await
        .unwrap();
    let balance: i64 = system
        .call(a.handle, Payload::local(AccountMessage::Balance), None, None)
        .await
        .unwrap();
    println!("ledger balance: {balance}");
    assert_eq!(balance, 50);

    let overdraft: Result<(), SystemError> = system
        .call(
            a.handle,
            Payload::local(AccountMessage::Withdraw(1_000_000)),
            None,
            None,
        )
        .await;
    assert!(overdraft.is_err());
    println!("overdraft rejected as expected");

    // Circuit-breaker pattern.
    let breaker = system
        .create(
            || CircuitBreaker {
                failures: Arc::new(AtomicU32::new(0)),
                trip_after: 3,
                attempt: 0,
            },
            None,
            None,
        )
        .await
        .unwrap();

    for i in 0..5 {
        let outcome: Result<(), SystemError> =
            system.call(breaker, Payload::local(FlakyCall), None, None).await;
        println!("breaker call {i}: {outcome:?}");
    }

    println!("live actors: {}", system.list_actors().len());
    system.shutdown().await;
}
