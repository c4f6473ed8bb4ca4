// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Cortex Events
//
// In-memory event streaming over tokio broadcast channels. Publishing never
// blocks and never fails, so the decision loop stays tick-synchronous even
// when nobody listens.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::domain::events::{CortexEvent, SessionId};

/// Event bus for publishing and subscribing to cortex events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<CortexEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: CortexEvent) {
        let event_type = event.event_type();
        // send() only fails when there are no receivers
        let receiver_count = self.sender.send(event).unwrap_or(0);
        trace!(event_type, receiver_count, "Published cortex event");
    }

    /// Subscribe to all cortex events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to the events of one agent session only
    pub fn subscribe_session(&self, session_id: SessionId) -> SessionEventReceiver {
        SessionEventReceiver {
            receiver: self.sender.subscribe(),
            session_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver for all cortex events
pub struct EventReceiver {
    receiver: broadcast::Receiver<CortexEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<CortexEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<CortexEvent, EventBusError> {
        self.receiver.try_recv().map_err(map_try_recv_error)
    }
}

/// Receiver filtered on a single session
pub struct SessionEventReceiver {
    receiver: broadcast::Receiver<CortexEvent>,
    session_id: SessionId,
}

impl SessionEventReceiver {
    pub async fn recv(&mut self) -> Result<CortexEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if event.session_id() == self.session_id {
                return Ok(event);
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<CortexEvent, EventBusError> {
        loop {
            let event = self.receiver.try_recv().map_err(map_try_recv_error)?;
            if event.session_id() == self.session_id {
                return Ok(event);
            }
        }
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

fn map_try_recv_error(e: broadcast::error::TryRecvError) -> EventBusError {
    match e {
        broadcast::error::TryRecvError::Empty => EventBusError::Empty,
        broadcast::error::TryRecvError::Closed => EventBusError::Closed,
        broadcast::error::TryRecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternId;
    use chrono::Utc;

    fn cancelled(session_id: SessionId) -> CortexEvent {
        CortexEvent::IntentionCancelled {
            session_id,
            pattern_id: PatternId(3),
            depth: 2,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();
        let session_id = SessionId::new();

        event_bus.publish(cancelled(session_id));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "intention_cancelled");
        assert_eq!(received.session_id(), session_id);
    }

    #[tokio::test]
    async fn test_session_receiver_filters_other_sessions() {
        let event_bus = EventBus::new(10);
        let ours = SessionId::new();
        let mut receiver = event_bus.subscribe_session(ours);

        event_bus.publish(cancelled(SessionId::new()));
        event_bus.publish(cancelled(ours));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.session_id(), ours);
        assert!(matches!(receiver.try_recv(), Err(EventBusError::Empty)));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let event_bus = EventBus::default();
        event_bus.publish(cancelled(SessionId::new()));
        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_lagged_receiver() {
        let event_bus = EventBus::new(2);
        let mut receiver = event_bus.subscribe();
        let session_id = SessionId::new();

        for _ in 0..5 {
            event_bus.publish(cancelled(session_id));
        }

        assert!(matches!(receiver.try_recv(), Err(EventBusError::Lagged(3))));
        assert!(receiver.try_recv().is_ok());
    }
}
