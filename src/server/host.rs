//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds everything a request needs (stores, token service,
//! auth provider, event bus, mailer, configuration). REST and WebSocket
//! exposures both build their routers from the same host.

use crate::accounts::AccountService;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, TokenService};
use crate::core::events::EventBus;
use crate::mail::Mailer;
use crate::payments::{EventBusNotifier, NoopNotifier, PaymentLedger, PaymentNotifier};
use crate::storage::Stores;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerBuilder::new().with_config(config).build_host()?);
///
/// let rest_app = RestExposure::build_router(host.clone(), vec![])?;
/// let ws_app = WebSocketExposure::build_router(host)?;
/// ```
pub struct ServerHost {
    pub config: Arc<AppConfig>,

    pub stores: Stores,

    pub tokens: Arc<TokenService>,

    /// Resolves the `Authorization` header into an `AuthContext`
    pub auth: Arc<dyn AuthProvider>,

    pub mailer: Arc<dyn Mailer>,

    /// Optional event bus for real-time notifications
    ///
    /// When present, payment operations publish `PaymentApproved` events and
    /// the WebSocket exposure forwards them to the tenant's room.
    pub event_bus: Option<Arc<EventBus>>,
}

impl ServerHost {
    /// Build the host from builder components
    pub fn from_builder_components(
        config: AppConfig,
        stores: Stores,
        tokens: Arc<TokenService>,
        auth: Arc<dyn AuthProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            stores,
            tokens,
            auth,
            mailer,
            event_bus: None,
        }
    }

    /// Set the event bus for real-time notifications
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(Arc::new(event_bus));
        self
    }

    /// Get a reference to the event bus (if configured)
    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }

    /// Payment ledger wired to the host's stores and event bus
    pub fn ledger(&self) -> PaymentLedger {
        let notifier: Arc<dyn PaymentNotifier> = match &self.event_bus {
            Some(bus) => Arc::new(EventBusNotifier::new(bus.clone())),
            None => Arc::new(NoopNotifier),
        };
        PaymentLedger::new(self.stores.clone(), notifier)
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(
            self.stores.users.clone(),
            self.tokens.clone(),
            self.mailer.clone(),
            self.config.email.frontend_url.clone(),
            self.config.email.sender_name.clone(),
        )
    }
}
