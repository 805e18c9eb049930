//! In-process object store / 内存对象存储
//!
//! Used for local runs without an object store and by the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::io::AsyncReadExt;

use super::{ObjectBody, ObjectStore, StoreClientConfig, StoreError, StoreFactory, StoreHandle, StoredObject};

#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<(String, String), Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.get(bucket, key)
            .ok_or_else(|| StoreError::with_status(404, "The specified key does not exist."))
    }

    async fn write(&self, bucket: &str, key: &str, mut body: ObjectBody) -> Result<StoredObject, StoreError> {
        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .await
            .map_err(|e| StoreError::new(format!("Failed to read upload body: {}", e)))?;

        let size = data.len();
        self.objects
            .write()
            .insert((bucket.to_string(), key.to_string()), Bytes::from(data));
        tracing::debug!("Memory store write: bucket={}, key={}, size={}", bucket, key, size);

        Ok(StoredObject {
            location: format!("memory://{}/{}", bucket, key.trim_start_matches('/')),
        })
    }
}

/// Memory store factory; every configure call returns the same shared map
#[derive(Clone, Default)]
pub struct MemoryStoreFactory {
    store: MemoryStore,
}

impl MemoryStoreFactory {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn driver_type(&self) -> &'static str {
        "memory"
    }

    fn configure(&self, _config: StoreClientConfig) -> StoreHandle {
        Arc::new(self.store.clone())
    }
}
