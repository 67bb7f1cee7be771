//! Record Store: typed access to the three persisted collections.
//!
//! Every mutation is a read-modify-write of one whole collection, so each
//! collection has its own async mutex held across the backend read and write.
//! That makes the store single-writer per collection: concurrent submissions
//! queue on the lock instead of overwriting each other's records.
//!
//! The storage engine sits behind `StorageBackend` and only ever sees raw JSON
//! values, keeping the typed surface (`get`, `put`, `upsert`, `mutate`) here.

pub mod json_file;
#[cfg(test)]
pub mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{Candidate, RecordId, Requisition, Review};

pub use json_file::JsonFileBackend;
#[cfg(test)]
pub use memory::MemoryBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Requisitions,
    Candidates,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Requisitions,
        Collection::Candidates,
        Collection::Reviews,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Requisitions => "requisitions",
            Collection::Candidates => "candidates",
            Collection::Reviews => "reviews",
        }
    }

    fn index(self) -> usize {
        match self {
            Collection::Requisitions => 0,
            Collection::Candidates => 1,
            Collection::Reviews => 2,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {collection} collection: {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },

    #[error("{collection} collection is corrupt: {detail}")]
    Corrupt {
        collection: Collection,
        detail: String,
    },

    #[error("could not encode {collection} record: {source}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Swappable persistence engine. Works on whole collections of raw JSON records.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;
    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError>;
}

/// A record type bound to its collection.
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    const COLLECTION: Collection;

    fn record_id(&self) -> &RecordId;
}

impl Record for Requisition {
    const COLLECTION: Collection = Collection::Requisitions;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Candidate {
    const COLLECTION: Collection = Collection::Candidates;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    locks: [Mutex<()>; 3],
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    /// Returns the whole collection in insertion order.
    pub async fn get<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.locks[T::COLLECTION.index()].lock().await;
        self.read::<T>().await
    }

    /// Replaces the whole collection.
    pub async fn put<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let _guard = self.locks[T::COLLECTION.index()].lock().await;
        self.write(records).await
    }

    /// Replaces the record with the same id, or appends it.
    pub async fn upsert<T: Record>(&self, record: T) -> Result<T, StoreError>
    where
        T: Clone,
    {
        let stored = record.clone();
        self.mutate(move |records: &mut Vec<T>| {
            match records
                .iter_mut()
                .find(|existing| existing.record_id() == record.record_id())
            {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        })
        .await?;
        Ok(stored)
    }

    /// Atomic read-modify-write of one collection. The closure runs while the
    /// collection lock is held; its result is returned once the write lands.
    pub async fn mutate<T, R, F>(&self, apply: F) -> Result<R, StoreError>
    where
        T: Record,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> R + Send,
    {
        let _guard = self.locks[T::COLLECTION.index()].lock().await;
        let mut records = self.read::<T>().await?;
        let outcome = apply(&mut records);
        self.write(&records).await?;
        Ok(outcome)
    }

    async fn read<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let collection = T::COLLECTION;
        let raw = self.backend.load(collection).await?;
        debug!(collection = %collection, records = raw.len(), "Loaded collection");
        raw.into_iter()
            .enumerate()
            .map(|(position, value)| {
                serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                    collection,
                    detail: format!("record {position}: {e}"),
                })
            })
            .collect()
    }

    async fn write<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let collection = T::COLLECTION;
        let raw = records
            .iter()
            .map(|r| serde_json::to_value(r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Encode { collection, source })?;
        self.backend.save(collection, &raw).await?;
        debug!(collection = %collection, records = raw.len(), "Saved collection");
        Ok(())
    }
}
