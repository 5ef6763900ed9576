//! Core module containing the fundamental traits and types of the portal

pub mod auth;
pub mod entity;
pub mod error;
pub mod events;
pub mod extractors;
pub mod password;
pub mod service;
pub mod validation;

pub use auth::{
    AuthContext, AuthPolicy, AuthProvider, Claims, JwtAuthProvider, NoAuthProvider, TokenError,
    TokenPurpose, TokenService,
};
pub use entity::Entity;
pub use error::{
    ConfigError, EntityError, PaymentError, PortalError, PortalResult, RequestError, StorageError,
    ValidationError,
};
pub use events::{EventBus, EventEnvelope, PortalEvent};
pub use extractors::Auth;
pub use service::DataService;
pub use validation::ValidatedJson;
