// services/live_hub.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::ws_messages::ServerMessage;

pub type ClientId = Uuid;

type Sender = UnboundedSender<ServerMessage>;

#[derive(Default)]
struct HubInner {
    // event id -> the connections currently watching it
    subscribers: HashMap<i64, HashMap<ClientId, Sender>>,
    // reverse index so a re-subscribe or disconnect can drop the old binding
    bindings: HashMap<ClientId, i64>,
}

// Registry of live subscriptions plus the fan-out path over it. One instance
// is owned by AppState and injected into the session handlers; state lives
// for the process lifetime only, so reconnecting clients must re-subscribe.
#[derive(Clone, Default)]
pub struct LiveHub {
    inner: Arc<RwLock<HubInner>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    // Bind a connection to an event. A connection holds at most one binding:
    // registering under a new event drops the old one, re-registering under
    // the same event keeps a single entry.
    pub async fn register(&self, client_id: ClientId, event_id: i64, sender: Sender) {
        let mut inner = self.inner.write().await;

        if let Some(previous) = inner.bindings.insert(client_id, event_id) {
            if previous != event_id {
                if let Some(set) = inner.subscribers.get_mut(&previous) {
                    set.remove(&client_id);
                    if set.is_empty() {
                        inner.subscribers.remove(&previous);
                    }
                }
            }
        }

        inner
            .subscribers
            .entry(event_id)
            .or_default()
            .insert(client_id, sender);
    }

    // Drop whatever binding the connection holds; no-op if it has none.
    // Called on every disconnect so the registry cannot accumulate stale
    // entries.
    pub async fn deregister(&self, client_id: ClientId) {
        let mut inner = self.inner.write().await;

        if let Some(event_id) = inner.bindings.remove(&client_id) {
            if let Some(set) = inner.subscribers.get_mut(&event_id) {
                set.remove(&client_id);
                if set.is_empty() {
                    inner.subscribers.remove(&event_id);
                }
            }
        }
    }

    // Snapshot of the current subscriber channels for an event. Cloned out
    // from under the lock so delivery never races a register/deregister.
    pub async fn subscribers_of(&self, event_id: i64) -> Vec<Sender> {
        let inner = self.inner.read().await;
        inner
            .subscribers
            .get(&event_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    // Best-effort fan-out, at most once per connection. A send only fails
    // when the session's receiving half is already gone; that connection is
    // skipped and the rest still get the message.
    pub async fn broadcast(&self, event_id: i64, message: ServerMessage) {
        let senders = self.subscribers_of(event_id).await;
        if senders.is_empty() {
            return;
        }

        let mut delivered = 0usize;
        for sender in &senders {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }

        tracing::debug!(event_id, delivered, total = senders.len(), "broadcast live update");
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.read().await.bindings.len()
    }

    pub async fn event_count(&self) -> usize {
        self.inner.read().await.subscribers.len()
    }
}
