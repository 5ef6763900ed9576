//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryDataService;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoDataService;

use crate::core::DataService;
#[cfg(feature = "mongodb_backend")]
use crate::core::StorageError;
use crate::entities::{Complaint, House, Message, Payment, Rental, User};
use std::sync::Arc;

/// One store per record type, shared by every request
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn DataService<User>>,
    pub houses: Arc<dyn DataService<House>>,
    pub rentals: Arc<dyn DataService<Rental>>,
    pub payments: Arc<dyn DataService<Payment>>,
    pub complaints: Arc<dyn DataService<Complaint>>,
    pub messages: Arc<dyn DataService<Message>>,
}

impl Stores {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryDataService::new()),
            houses: Arc::new(InMemoryDataService::new()),
            rentals: Arc::new(InMemoryDataService::new()),
            payments: Arc::new(InMemoryDataService::new()),
            complaints: Arc::new(InMemoryDataService::new()),
            messages: Arc::new(InMemoryDataService::new()),
        }
    }

    /// MongoDB-backed stores, one collection per record type
    #[cfg(feature = "mongodb_backend")]
    pub fn mongodb(database: ::mongodb::Database) -> Self {
        Self {
            users: Arc::new(MongoDataService::new(database.clone())),
            houses: Arc::new(MongoDataService::new(database.clone())),
            rentals: Arc::new(MongoDataService::new(database.clone())),
            payments: Arc::new(MongoDataService::new(database.clone())),
            complaints: Arc::new(MongoDataService::new(database.clone())),
            messages: Arc::new(MongoDataService::new(database)),
        }
    }

    /// Connect to MongoDB at `url` and use the database `name`
    #[cfg(feature = "mongodb_backend")]
    pub async fn connect_mongodb(url: &str, name: &str) -> Result<Self, StorageError> {
        let client = ::mongodb::Client::with_uri_str(url).await.map_err(|e| {
            StorageError::ConnectionError {
                backend: "mongodb".to_string(),
                message: e.to_string(),
            }
        })?;
        tracing::info!(database = %name, "connected to MongoDB");
        Ok(Self::mongodb(client.database(name)))
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::in_memory()
    }
}
