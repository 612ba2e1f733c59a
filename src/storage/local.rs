//! Local filesystem object store

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use super::ObjectStore;
use crate::errors::StorageError;

/// Stores objects as plain files under one root directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are flat names; anything that could escape the root is refused.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError> {
        let path = self.object_path(key)?;

        fs::write(&path, &data)
            .await
            .map_err(|source| StorageError::Io { path: path.clone(), source })?;

        info!(
            "Stored object locally: {} ({}, {} bytes)",
            path.display(),
            content_type,
            content_length
        );
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }

    async fn initialize(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io { path: self.root.clone(), source })?;
        info!("Ensured object directory exists: {:?}", self.root);
        Ok(())
    }
}
