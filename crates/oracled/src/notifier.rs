//! Queue update fan-out.
//!
//! Observers register a channel and receive a queue snapshot after every
//! store mutation. Delivery is fire-and-forget per observer: one failed
//! send logs a warning and drops only that observer, never affecting the
//! store or the other observers.

use oracle_common::rpc::QueueUpdate;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct Observer {
    name: String,
    tx: mpsc::UnboundedSender<QueueUpdate>,
}

#[derive(Default)]
pub struct QueueNotifier {
    observers: Mutex<Vec<Observer>>,
}

impl QueueNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer and get its receiving end.
    pub async fn subscribe(&self, name: &str) -> mpsc::UnboundedReceiver<QueueUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut observers = self.observers.lock().await;
        observers.push(Observer {
            name: name.to_string(),
            tx,
        });
        debug!(observer = name, total = observers.len(), "queue observer registered");
        rx
    }

    /// Push an update to every observer independently.
    pub async fn publish(&self, update: QueueUpdate) {
        let mut observers = self.observers.lock().await;
        observers.retain(|obs| match obs.tx.send(update.clone()) {
            Ok(()) => true,
            Err(_) => {
                warn!(observer = %obs.name, "dropping queue observer: delivery failed");
                false
            }
        });
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.lock().await.len()
    }
}
