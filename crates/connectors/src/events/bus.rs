use model::events::{DataProviderEvent, EventType};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{RwLock, mpsc, mpsc::error::TrySendError};
use tracing::{debug, warn};

/// Delivery end of a listener.
///
/// A bounded listener drops events while its channel is full. An unbounded
/// listener receives every event; relays use it.
#[derive(Debug, Clone)]
pub enum EventSender {
    Bounded(mpsc::Sender<Arc<DataProviderEvent>>),
    Unbounded(mpsc::UnboundedSender<Arc<DataProviderEvent>>),
}

enum Delivery {
    Sent,
    Full,
    Closed,
}

impl EventSender {
    fn deliver(&self, event: Arc<DataProviderEvent>) -> Delivery {
        match self {
            EventSender::Bounded(sender) => match sender.try_send(event) {
                Ok(()) => Delivery::Sent,
                Err(TrySendError::Full(_)) => Delivery::Full,
                Err(TrySendError::Closed(_)) => Delivery::Closed,
            },
            EventSender::Unbounded(sender) => match sender.send(event) {
                Ok(()) => Delivery::Sent,
                Err(_) => Delivery::Closed,
            },
        }
    }
}

impl From<mpsc::Sender<Arc<DataProviderEvent>>> for EventSender {
    fn from(sender: mpsc::Sender<Arc<DataProviderEvent>>) -> Self {
        EventSender::Bounded(sender)
    }
}

impl From<mpsc::UnboundedSender<Arc<DataProviderEvent>>> for EventSender {
    fn from(sender: mpsc::UnboundedSender<Arc<DataProviderEvent>>) -> Self {
        EventSender::Unbounded(sender)
    }
}

/// A listener handle that can be used to remove the listener again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event_type: EventType,
    subscriber_id: u64,
}

impl Subscription {
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

/// Listener registry of a data provider.
///
/// Events are shared as `Arc`s, so every listener (and every relay) observes
/// the very same event object.
#[derive(Clone, Default)]
pub struct EventBus {
    // Map of EventType -> (Map of SubscriberID -> Sender)
    subscribers: Arc<RwLock<HashMap<EventType, HashMap<u64, EventSender>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_event_listener(
        &self,
        event_type: EventType,
        sender: impl Into<EventSender>,
    ) -> Subscription {
        let sender = sender.into();
        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(event_type)
            .or_default()
            .insert(subscriber_id, sender);

        debug!(
            event_type = event_type.as_str(),
            subscriber_id = subscriber_id,
            "Added event listener"
        );

        Subscription {
            event_type,
            subscriber_id,
        }
    }

    pub async fn remove_event_listener(&self, subscription: &Subscription) {
        let mut subscribers = self.subscribers.write().await;

        if let Some(listeners) = subscribers.get_mut(&subscription.event_type) {
            listeners.remove(&subscription.subscriber_id);

            debug!(
                subscriber_id = subscription.subscriber_id,
                "Removed event listener"
            );

            if listeners.is_empty() {
                subscribers.remove(&subscription.event_type);
            }
        }
    }

    pub async fn dispatch_event(&self, event: DataProviderEvent) {
        self.dispatch(Arc::new(event)).await;
    }

    /// Delivers an already shared event to every listener of its type.
    pub async fn dispatch(&self, event: Arc<DataProviderEvent>) {
        let event_type = event.event_type();
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            let Some(listeners) = subscribers.get(&event_type) else {
                debug!(event_type = event_type.as_str(), "No listeners for event");
                return;
            };

            debug!(
                event_type = event_type.as_str(),
                listener_count = listeners.len(),
                "Dispatching event"
            );

            for (subscriber_id, sender) in listeners.iter() {
                match sender.deliver(event.clone()) {
                    Delivery::Sent => {}
                    Delivery::Full => {
                        warn!(
                            event_type = event_type.as_str(),
                            subscriber_id = subscriber_id,
                            "Dropped event for slow listener (channel full)"
                        );
                    }
                    Delivery::Closed => closed.push(*subscriber_id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            if let Some(listeners) = subscribers.get_mut(&event_type) {
                for id in &closed {
                    listeners.remove(id);
                }
                if listeners.is_empty() {
                    subscribers.remove(&event_type);
                }
            }
            debug!(
                event_type = event_type.as_str(),
                pruned = closed.len(),
                "Pruned closed listeners"
            );
        }
    }

    pub async fn listener_count(&self, event_type: EventType) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.get(&event_type).map(|l| l.len()).unwrap_or(0)
    }

    pub async fn clear(&self) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.clear();
        debug!("Cleared all event listeners");
    }
}
