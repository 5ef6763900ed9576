//! In-memory implementation of DataService for testing and development

use crate::core::{DataService, Entity};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory data service implementation
///
/// Records are kept in insertion order, which breaks ties between records
/// created within the same clock tick. Uses RwLock for thread-safe access;
/// locks are never held across an `.await`.
#[derive(Clone)]
pub struct InMemoryDataService<T> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T> InMemoryDataService<T> {
    /// Create a new empty in-memory data service
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<T> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryDataService<T> {
    /// Newest first: later insertions win ties on `created_at`
    fn newest_first(mut records: Vec<T>) -> Vec<T> {
        records.reverse();
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        records
    }
}

/// Compare a serialized field against the string form used by `search`
fn field_matches(record: &Value, field: &str, value: &str) -> bool {
    match record.get(field) {
        Some(Value::String(s)) => s == value,
        Some(Value::Bool(b)) => b.to_string() == value,
        Some(Value::Number(n)) => {
            n.to_string() == value
                || matches!((n.as_f64(), value.parse::<f64>()), (Some(a), Ok(b)) if a == b)
        }
        _ => false,
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, entity: T) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if records.contains_key(&entity.id()) {
            return Err(anyhow!(
                "{} {} already exists",
                T::resource_name_singular(),
                entity.id()
            ));
        }
        records.insert(entity.id(), entity.clone());

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>> {
        let snapshot: Vec<T> = {
            let records = self
                .records
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            records.values().cloned().collect()
        };

        Ok(Self::newest_first(snapshot))
    }

    async fn update(&self, id: &Uuid, entity: T) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let slot = records
            .get_mut(id)
            .ok_or_else(|| anyhow!("{} not found: {}", T::resource_name_singular(), id))?;
        *slot = entity.clone();

        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.shift_remove(id);

        Ok(())
    }

    async fn search(&self, field: &str, value: &str) -> Result<Vec<T>> {
        let snapshot: Vec<T> = {
            let records = self
                .records
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            records.values().cloned().collect()
        };

        let mut matches = Vec::new();
        for record in snapshot {
            let json = serde_json::to_value(&record)?;
            if field_matches(&json, field, value) {
                matches.push(record);
            }
        }

        Ok(Self::newest_first(matches))
    }
}
