//! Factory for creating object stores based on configuration

use std::sync::Arc;

use super::local::LocalObjectStore;
use super::{ObjectStore, StorageConfig};
use crate::config::{Config, StorageBackendKind};
use crate::errors::StorageError;

#[cfg(feature = "s3")]
use super::s3::S3ObjectStore;

/// Create and initialize an object store for the given configuration
pub async fn create_object_store(
    config: StorageConfig,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config {
        StorageConfig::Local { root } => {
            let store = LocalObjectStore::new(root);
            store.initialize().await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "s3")]
        StorageConfig::S3 { s3_config } => {
            let store = S3ObjectStore::new(s3_config)?;
            store.initialize().await?;
            Ok(Arc::new(store))
        }
    }
}

/// Select the storage configuration from the process configuration
pub fn storage_config_from_env(config: &Config) -> Result<StorageConfig, StorageError> {
    match config.storage_backend {
        StorageBackendKind::Local => Ok(StorageConfig::Local {
            root: config.local_storage_path.clone(),
        }),
        #[cfg(feature = "s3")]
        StorageBackendKind::S3 => Ok(StorageConfig::S3 {
            s3_config: config.s3.clone(),
        }),
        #[cfg(not(feature = "s3"))]
        StorageBackendKind::S3 => Err(StorageError::Configuration(
            "S3 storage requested but S3 feature not compiled in".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_local_backend_selected() {
        let config = config(&[("STORAGE_BACKEND", "local"), ("LOCAL_STORAGE_PATH", "/srv/photos")]);
        match storage_config_from_env(&config).unwrap() {
            StorageConfig::Local { root } => assert_eq!(root, "/srv/photos"),
            #[allow(unreachable_patterns)]
            other => panic!("expected local storage, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_local_object_store() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("objects");
        let store = create_object_store(StorageConfig::Local {
            root: root.to_string_lossy().to_string(),
        })
        .await
        .unwrap();

        assert_eq!(store.storage_type(), "local");
        assert!(root.is_dir());
    }

    #[cfg(feature = "s3")]
    #[test]
    fn test_s3_backend_selected_by_default() {
        let config = config(&[("S3_BUCKET", "photos")]);
        match storage_config_from_env(&config).unwrap() {
            StorageConfig::S3 { s3_config } => assert_eq!(s3_config.bucket_name, "photos"),
            other => panic!("expected S3 storage, got {:?}", other),
        }
    }
}
