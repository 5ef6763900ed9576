//! Internal event system for real-time notifications
//!
//! The EventBus decouples domain mutations from delivery. It uses
//! `tokio::sync::broadcast`, so publishing never blocks and never fails.
//!
//! # Architecture
//!
//! ```text
//! PaymentLedger ──▶ EventBusNotifier ──▶ EventBus::publish() ──▶ broadcast channel ──▶ WebSocket dispatcher
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let event_bus = EventBus::new(1024);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.publish(PortalEvent::PaymentApproved { tenant_id, payment: view });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("Received: {:?}", envelope.event);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::payments::PaymentView;

/// Events published by the domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortalEvent {
    /// A payment reached `successful`, either on creation or through approval
    PaymentApproved { tenant_id: Uuid, payment: PaymentView },
}

impl PortalEvent {
    /// Name of the event kind
    pub fn event_kind(&self) -> &str {
        match self {
            PortalEvent::PaymentApproved { .. } => "payment_approved",
        }
    }

    /// The tenant whose private channel should receive this event
    pub fn tenant_id(&self) -> Uuid {
        match self {
            PortalEvent::PaymentApproved { tenant_id, .. } => *tenant_id,
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: PortalEvent,
}

impl EventEnvelope {
    /// Create a new event envelope
    pub fn new(event: PortalEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone and shareable across tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers that will receive the event. With no
    /// subscribers the event is dropped.
    pub fn publish(&self, event: PortalEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
