use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{BlobStore, StorageError};

/// In-memory blob store for tests. `fail_puts` simulates a write outage.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    fail_puts: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(container: &str, key: &str, bytes: &[u8]) -> Self {
        let store = Self::new();
        store
            .objects
            .lock()
            .unwrap()
            .insert((container.to_string(), key.to_string()), bytes.to_vec());
        store
    }

    pub fn failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn object(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.object(container, key)
            .ok_or_else(|| StorageError::not_found(container, key))
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        if self.fail_puts {
            return Err(StorageError::Http {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert((container.to_string(), key.to_string()), bytes);
        Ok(())
    }
}
