//! Object storage abstraction for uploaded photos
//!
//! Photos are written once under a flat key and must be publicly readable
//! afterwards. S3-compatible storage is the production backend; the local
//! filesystem backend serves development setups.

use async_trait::async_trait;

use crate::errors::StorageError;

pub mod factory;
pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

/// Core object store trait that all storage implementations must implement
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, publicly readable.
    ///
    /// The whole payload is already in memory; `content_length` is its size
    /// as reported by the upload.
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError>;

    /// Get a human-readable identifier for this storage backend type
    fn storage_type(&self) -> &'static str;

    /// Prepare the backend before serving (create directories, etc.)
    async fn initialize(&self) -> Result<(), StorageError>;
}

/// Storage configuration enum for different backend types
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local filesystem storage
    Local {
        root: String,
    },
    /// S3-compatible storage
    #[cfg(feature = "s3")]
    S3 {
        s3_config: crate::config::S3Config,
    },
}
