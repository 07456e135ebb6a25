use async_trait::async_trait;
use thiserror::Error;

pub mod fs;
pub mod http;
#[cfg(test)]
pub mod memory;

pub use fs::FsBlobStore;
pub use http::HttpBlobStore;
#[cfg(test)]
pub use memory::MemoryBlobStore;

/// Errors raised by blob store backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object does not exist. Callers treat this as an empty cache.
    #[error("object {container}/{key} not found")]
    NotFound { container: String, key: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("storage request failed: {0}")]
    Request(String),
}

impl StorageError {
    pub fn not_found(container: &str, key: &str) -> Self {
        StorageError::NotFound {
            container: container.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Named-blob storage: get and put whole objects by container and key
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the object bytes, `StorageError::NotFound` when absent
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or replace the object
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
}
