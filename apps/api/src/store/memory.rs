use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Collection, StorageBackend, StoreError};

/// Process-local backend. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend lock poisoned".to_string()))?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend lock poisoned".to_string()))?;
        collections.insert(collection, records.to_vec());
        Ok(())
    }
}
