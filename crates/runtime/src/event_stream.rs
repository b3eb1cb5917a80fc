//! Relay event broadcasting.

use serde::{Deserialize, Serialize};
use sigil_engine::EngineEvent;
use sigil_registry::RegistryEvent;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error};

/// Events broadcast by the relay service: submission lifecycle plus the
/// engine and governance events each execution committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayEvent {
    /// A bundle submission was accepted for processing.
    Received {
        submission_id: String,
        chain_id: u64,
        wallet: alloy_primitives::Address,
    },

    /// Verification and execution succeeded.
    Executed {
        submission_id: String,
        chain_id: u64,
        wallet: alloy_primitives::Address,
        nonce_consumed: u64,
    },

    /// Verification or execution failed; the chain state is unchanged.
    Failed {
        submission_id: String,
        chain_id: u64,
        wallet: alloy_primitives::Address,
        error: String,
    },

    /// A committed engine event, re-broadcast.
    Engine { chain_id: u64, event: EngineEvent },

    /// A committed governance event, re-broadcast.
    Governance { chain_id: u64, event: RegistryEvent },
}

/// Broadcast stream of relay events.
pub struct EventStream {
    sender: broadcast::Sender<RelayEvent>,
    receiver_count: Arc<RwLock<usize>>,
}

impl EventStream {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            receiver_count: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        *self.receiver_count.write().await += 1;
        self.sender.subscribe()
    }

    /// Emit an event. Dropped silently when nobody is listening.
    pub fn emit(&self, event: RelayEvent) {
        debug!(?event, "emitting relay event");
        if let Err(e) = self.sender.send(event) {
            debug!("no receivers for event: {e}");
        }
    }

    pub async fn receiver_count(&self) -> usize {
        *self.receiver_count.read().await
    }
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new(1_000)
    }
}

/// Selective subscription.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub include_lifecycle: bool,
    pub include_engine: bool,
    pub include_governance: bool,
    /// When set, only events for these chains pass.
    pub chain_filter: Option<Vec<u64>>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            include_lifecycle: true,
            include_engine: true,
            include_governance: true,
            chain_filter: None,
        }
    }
}

impl EventFilter {
    pub fn matches(&self, event: &RelayEvent) -> bool {
        let (chain_id, included) = match event {
            RelayEvent::Received { chain_id, .. }
            | RelayEvent::Executed { chain_id, .. }
            | RelayEvent::Failed { chain_id, .. } => (*chain_id, self.include_lifecycle),
            RelayEvent::Engine { chain_id, .. } => (*chain_id, self.include_engine),
            RelayEvent::Governance { chain_id, .. } => (*chain_id, self.include_governance),
        };
        if !included {
            return false;
        }
        match &self.chain_filter {
            Some(chains) => chains.contains(&chain_id),
            None => true,
        }
    }
}

/// A receiver that drops events the filter rejects.
pub struct FilteredEventStream {
    receiver: broadcast::Receiver<RelayEvent>,
    filter: EventFilter,
}

impl FilteredEventStream {
    pub fn new(receiver: broadcast::Receiver<RelayEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event; `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    error!("event stream lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn received(chain_id: u64) -> RelayEvent {
        RelayEvent::Received {
            submission_id: "s-1".to_string(),
            chain_id,
            wallet: Address::repeat_byte(2),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let stream = EventStream::default();
        let mut a = stream.subscribe().await;
        let mut b = stream.subscribe().await;
        assert_eq!(stream.receiver_count().await, 2);

        stream.emit(received(1));

        for rx in [&mut a, &mut b] {
            match rx.recv().await.unwrap() {
                RelayEvent::Received { chain_id, .. } => assert_eq!(chain_id, 1),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn filter_by_chain_and_kind() {
        let filter = EventFilter {
            include_lifecycle: true,
            include_engine: false,
            include_governance: true,
            chain_filter: Some(vec![137]),
        };

        assert!(filter.matches(&received(137)));
        assert!(!filter.matches(&received(1)), "wrong chain");
        assert!(
            !filter.matches(&RelayEvent::Engine {
                chain_id: 137,
                event: sigil_engine::EngineEvent::BundleExecuted {
                    wallet: Address::repeat_byte(2),
                    chain_id: 137,
                    nonce: 0,
                },
            }),
            "engine events excluded"
        );
    }

    #[tokio::test]
    async fn filtered_stream_skips_rejected_events() {
        let stream = EventStream::default();
        let rx = stream.subscribe().await;
        let mut filtered = FilteredEventStream::new(
            rx,
            EventFilter {
                chain_filter: Some(vec![10]),
                ..EventFilter::default()
            },
        );

        stream.emit(received(1));
        stream.emit(received(10));
        drop(stream);

        match filtered.recv().await.unwrap() {
            RelayEvent::Received { chain_id, .. } => assert_eq!(chain_id, 10),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(filtered.recv().await.is_none());
    }
}
