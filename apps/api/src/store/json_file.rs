//! JSON-file backend: one pretty-printed document per collection under a data
//! directory. Writes go to a temp file in the same directory and are renamed
//! over the target, so readers never observe a half-written collection.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use super::{Collection, StorageBackend, StoreError};

pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the data directory and an empty document for every missing collection.
    pub async fn init(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                collection: Collection::Requisitions,
                source,
            })?;

        for collection in Collection::ALL {
            let path = self.path_for(collection);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }
            self.save(collection, &[]).await?;
            info!(path = %path.display(), "Created empty {collection} collection");
        }
        Ok(())
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(file_name(collection))
    }
}

fn file_name(collection: Collection) -> &'static str {
    match collection {
        Collection::Requisitions => "requisitions.json",
        Collection::Candidates => "candidates.json",
        Collection::Reviews => "pr-reviews.json",
    }
}

/// The review log is stored as `{"reviews": [...]}`; the others are bare arrays.
fn wrapper_key(collection: Collection) -> Option<&'static str> {
    match collection {
        Collection::Reviews => Some("reviews"),
        Collection::Requisitions | Collection::Candidates => None,
    }
}

fn decode(collection: Collection, text: &str) -> Result<Vec<Value>, StoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let corrupt = |detail: String| StoreError::Corrupt { collection, detail };

    match serde_json::from_str::<Value>(text).map_err(|e| corrupt(e.to_string()))? {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => {
            let key = wrapper_key(collection)
                .ok_or_else(|| corrupt("expected a JSON array".to_string()))?;
            match map.remove(key) {
                Some(Value::Array(records)) => Ok(records),
                _ => Err(corrupt(format!("expected an array under \"{key}\""))),
            }
        }
        _ => Err(corrupt("expected a JSON array".to_string())),
    }
}

fn encode(collection: Collection, records: &[Value]) -> Result<Vec<u8>, StoreError> {
    let document = match wrapper_key(collection) {
        Some(key) => {
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(key.to_string(), Value::Array(records.to_vec()));
            Value::Object(wrapped)
        }
        None => Value::Array(records.to_vec()),
    };
    serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Encode { collection, source })
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => decode(collection, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Io { collection, source }),
        }
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        let bytes = encode(collection, records)?;
        let dir = self.dir.clone();
        let target = self.path_for(collection);

        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))?
            .map_err(|source| StoreError::Io { collection, source })
    }
}
