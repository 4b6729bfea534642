#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use vulcn_types::VulcnError;

pub mod page_events;
pub use page_events::{ConsoleEvent, ConsoleLevel, DialogEvent, DialogKind, NetworkResponseEvent, PageEvent};

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), VulcnError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Simple in-memory bus suitable for unit tests and the single-page event
/// streams the Driver exposes to the Session Runner.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), VulcnError> {
        // No subscribers is not an error: a session with no plugins
        // interested in events still runs fine.
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Materialize an mpsc receiver from a bus subscription so callers can drain
/// events during a settle window without handling broadcast lag directly.
pub fn to_mpsc<E>(bus: Arc<InMemoryBus<E>>, capacity: usize) -> mpsc::Receiver<E>
where
    E: Event,
{
    let mut rx = bus.subscribe();
    let (tx, out_rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            if tx.send(ev).await.is_err() {
                break;
            }
        }
    });
    out_rx
}
