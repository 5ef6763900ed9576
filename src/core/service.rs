//! Persistence trait consumed by the domain

use crate::core::entity::Entity;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for managing stored records
///
/// Implementations provide CRUD operations for a specific record type.
/// The domain is agnostic to the underlying storage mechanism; writes are
/// last-write-wins with no versioning.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Create a new record
    async fn create(&self, entity: T) -> Result<T>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all records, newest first
    async fn list(&self) -> Result<Vec<T>>;

    /// Replace an existing record
    async fn update(&self, id: &Uuid, entity: T) -> Result<T>;

    /// Delete a record
    async fn delete(&self, id: &Uuid) -> Result<()>;

    /// Find records whose camelCase `field` equals `value`, newest first
    async fn search(&self, field: &str, value: &str) -> Result<Vec<T>>;
}
