//! Outbound capability used by the ledger to announce successful payments
//!
//! The ledger never knows who is listening. In the server the notifier feeds
//! the [`EventBus`], whose subscriber is the WebSocket dispatcher.

use std::sync::Arc;
use uuid::Uuid;

use crate::core::events::{EventBus, PortalEvent};
use crate::payments::PaymentView;

pub trait PaymentNotifier: Send + Sync {
    /// Fire-and-forget: delivery failures are never reported back
    fn payment_approved(&self, tenant_id: Uuid, payment: &PaymentView);
}

/// Publishes onto the in-process event bus
#[derive(Debug, Clone)]
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl PaymentNotifier for EventBusNotifier {
    fn payment_approved(&self, tenant_id: Uuid, payment: &PaymentView) {
        let receivers = self.bus.publish(PortalEvent::PaymentApproved {
            tenant_id,
            payment: payment.clone(),
        });
        tracing::debug!(
            tenant_id = %tenant_id,
            payment_id = %payment.id,
            receivers,
            "published payment approval"
        );
    }
}

/// Drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl PaymentNotifier for NoopNotifier {
    fn payment_approved(&self, _tenant_id: Uuid, _payment: &PaymentView) {}
}
