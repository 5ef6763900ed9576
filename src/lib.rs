//! # Tenant Portal
//!
//! Backend of a property-rental portal: houses, tenants, rentals, payments,
//! complaints and messages over a document store, with a WebSocket channel
//! that tells a tenant when one of their payments goes through.
//!
//! ## Features
//!
//! - **Payment ledger**: append-only payment attempts with the outstanding
//!   balance recomputed from history on every attempt
//! - **Cash approval**: admins confirm cash payments, which marks the rental paid
//! - **Real-time notification**: approved payments are pushed to the tenant's
//!   WebSocket room
//! - **Pluggable storage**: in-memory by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tenant_portal::prelude::*;
//!
//! let config = AppConfig::load()?;
//! ServerBuilder::new()
//!     .with_config(config)
//!     .with_stores(Stores::in_memory())
//!     .serve()
//!     .await?;
//! ```

pub mod accounts;
pub mod config;
pub mod core;
pub mod entities;
pub mod handlers;
pub mod mail;
pub mod payments;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Auth, AuthContext, AuthPolicy, AuthProvider, DataService, Entity, EventBus, EventEnvelope,
        JwtAuthProvider, NoAuthProvider, PortalError, PortalEvent, PortalResult, TokenPurpose,
        TokenService, ValidatedJson,
    };

    // === Records ===
    pub use crate::entities::{
        Availability, Complaint, ComplaintStatus, House, Message, NewPayment, Payment,
        PaymentMethod, PaymentStatus, PublicUser, Rental, RentalPaymentStatus, RentalStatus, Role,
        User,
    };

    // === Domain services ===
    pub use crate::accounts::AccountService;
    pub use crate::mail::{LogMailer, Mailer, MemoryMailer, OutgoingEmail};
    pub use crate::payments::{PaymentLedger, PaymentNotifier, PaymentView};

    // === Storage ===
    pub use crate::storage::{InMemoryDataService, Stores};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDataService;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost, WebSocketExposure};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
