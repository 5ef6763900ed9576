//! Typed error handling for the tenant portal
//!
//! Every domain operation returns a [`PortalResult`] and the HTTP layer
//! translates the error into a status code and a JSON body at the boundary.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a record is missing or would be duplicated
//! - [`ValidationError`]: malformed or invalid input
//! - [`RequestError`]: authentication and authorization failures
//! - [`PaymentError`]: illegal payment lifecycle transitions
//! - [`StorageError`]: persistence backend failures
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! let rental = rentals
//!     .get(&rental_id)
//!     .await?
//!     .ok_or_else(|| EntityError::not_found("rental", rental_id))?;
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::entities::PaymentStatus;

/// The main error type of the portal
#[derive(Debug)]
pub enum PortalError {
    /// Missing or duplicate records
    Entity(EntityError),

    /// Input validation errors
    Validation(ValidationError),

    /// Authentication / authorization errors
    Request(RequestError),

    /// Payment lifecycle errors
    Payment(PaymentError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Outbound integration failures (email)
    Integration(String),

    /// Unexpected failures
    Internal(String),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Entity(e) => write!(f, "{}", e),
            PortalError::Validation(e) => write!(f, "{}", e),
            PortalError::Request(e) => write!(f, "{}", e),
            PortalError::Payment(e) => write!(f, "{}", e),
            PortalError::Storage(e) => write!(f, "{}", e),
            PortalError::Config(e) => write!(f, "{}", e),
            PortalError::Integration(msg) => write!(f, "Integration error: {}", msg),
            PortalError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortalError::Entity(e) => Some(e),
            PortalError::Validation(e) => Some(e),
            PortalError::Request(e) => Some(e),
            PortalError::Payment(e) => Some(e),
            PortalError::Storage(e) => Some(e),
            PortalError::Config(e) => Some(e),
            PortalError::Integration(_) | PortalError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PortalError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Entity(e) => e.status_code(),
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Request(e) => e.status_code(),
            PortalError::Payment(_) => StatusCode::BAD_REQUEST,
            PortalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::Entity(e) => e.error_code(),
            PortalError::Validation(_) => "VALIDATION_ERROR",
            PortalError::Request(e) => e.error_code(),
            PortalError::Payment(e) => e.error_code(),
            PortalError::Storage(_) => "STORAGE_ERROR",
            PortalError::Config(_) => "CONFIG_ERROR",
            PortalError::Integration(_) => "INTEGRATION_ERROR",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PortalError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            PortalError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            PortalError::Payment(PaymentError::InvalidTransition { from, to, .. }) => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to records in the stores
#[derive(Debug)]
pub enum EntityError {
    /// Record was not found; `id` is the lookup key (a UUID or an email)
    NotFound { entity_type: String, id: String },

    /// A record with the same unique key already exists
    AlreadyExists {
        entity_type: String,
        field: String,
        value: String,
    },
}

impl EntityError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, .. } => {
                write!(f, "{} not found", capitalize(entity_type))
            }
            EntityError::AlreadyExists {
                entity_type,
                field,
                value,
            } => {
                write!(f, "{} with {} '{}' already exists", entity_type, field, value)
            }
        }
    }
}

impl std::error::Error for EntityError {}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<EntityError> for PortalError {
    fn from(err: EntityError) -> Self {
        PortalError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Body could not be parsed into the expected shape
    InvalidJson { message: String },

    /// Invalid UUID format
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Shorthand for a single field error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { message, .. } => write!(f, "{}", message),
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
                write!(f, "{}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            ValidationError::InvalidUuid { value } => {
                write!(f, "Invalid UUID format: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for PortalError {
    fn from(err: ValidationError) -> Self {
        PortalError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let name = camel_case(&field);
                errs.iter().map(move |e| FieldValidationError {
                    field: name.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", name, e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

/// Request bodies are camelCase on the wire; report fields under those names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<validator::ValidationErrors> for PortalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PortalError::Validation(errors.into())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to the caller's identity
#[derive(Debug)]
pub enum RequestError {
    /// Missing or invalid credentials
    Unauthorized { message: String },

    /// Authenticated but not allowed
    Forbidden { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RequestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

impl From<RequestError> for PortalError {
    fn from(err: RequestError) -> Self {
        PortalError::Request(err)
    }
}

// =============================================================================
// Payment Errors
// =============================================================================

/// Errors raised by the payment lifecycle
#[derive(Debug)]
pub enum PaymentError {
    /// Approval requested for a payment that is not cash
    NotCash { payment_id: Uuid },

    /// The requested status change is not allowed
    InvalidTransition {
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::NotCash { .. } => write!(f, "Only cash payments require approval"),
            PaymentError::InvalidTransition { from, to, .. } => {
                write!(f, "Payment cannot move from {} to {}", from, to)
            }
        }
    }
}

impl std::error::Error for PaymentError {}

impl PaymentError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::NotCash { .. } => "PAYMENT_NOT_CASH",
            PaymentError::InvalidTransition { .. } => "PAYMENT_INVALID_TRANSITION",
        }
    }
}

impl From<PaymentError> for PortalError {
    fn from(err: PaymentError) -> Self {
        PortalError::Payment(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query execution error
    QueryError { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { message } => write!(f, "Storage error: {}", message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for PortalError {
    fn from(err: StorageError) -> Self {
        PortalError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError { file: Option<String>, message: String },

    /// Missing required setting
    MissingField { field: String },

    /// Invalid value for a setting
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::MissingField { field } => {
                write!(f, "Missing required setting '{}'", field)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, message)
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for PortalError {
    fn from(err: ConfigError) -> Self {
        PortalError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for PortalError {
    fn from(err: uuid::Error) -> Self {
        PortalError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

/// Stores and other infrastructure report failures through `anyhow`
impl From<anyhow::Error> for PortalError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<PortalError>() {
            Ok(portal) => portal,
            Err(err) => PortalError::Storage(StorageError::QueryError {
                message: format!("{:#}", err),
            }),
        }
    }
}

/// A specialized Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
