//! Blob storage abstraction for attachment downloads.
//!
//! Real deployments back this with the platform's blob store; tests use the
//! in-memory implementation.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use thiserror::Error;

/// A failed blob download.
#[derive(Debug, Error)]
#[error("Blob download failed for {container}/{path}: {message}")]
pub struct BlobError {
    pub container: String,
    pub path: String,
    pub message: String,
}

/// Read access to already-rendered attachment blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download the full contents of one blob.
    ///
    /// # Errors
    /// Fails when the blob does not exist or cannot be read.
    async fn download(&self, container: &str, path: &str) -> Result<Vec<u8>, BlobError>;
}

/// In-memory blob store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<(String, String), Vec<u8>>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob under `container/path`.
    pub fn insert(&self, container: &str, path: &str, bytes: Vec<u8>) {
        self.blobs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert((container.to_string(), path.to_string()), bytes);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn download(&self, container: &str, path: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&(container.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| BlobError {
                container: container.to_string(),
                path: path.to_string(),
                message: "blob not found".to_string(),
            })
    }
}
