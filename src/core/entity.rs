//! Entity trait shared by every stored record

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all records kept in a [`DataService`](crate::core::DataService).
///
/// Every record has:
/// - id: Unique identifier (UUID v4)
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// Records are serialized with camelCase field names; storage backends rely on
/// the serde representation to persist and search them.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The plural resource name, used as collection name (e.g., "payments")
    fn resource_name() -> &'static str;

    /// The singular resource name, used in error messages (e.g., "payment")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Refresh `updated_at` before persisting a change
    fn touch(&mut self);
}

/// Implements [`Entity`] for a record struct with `id`, `created_at` and
/// `updated_at` fields.
#[macro_export]
macro_rules! impl_entity {
    ($type:ty, $singular:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = chrono::Utc::now();
            }
        }
    };
}
