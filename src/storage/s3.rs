use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use aws_types::region::Region as AwsRegion;
use tracing::{error, info};

use super::ObjectStore;
use crate::config::S3Config;
use crate::errors::StorageError;

/// Uploads photos to an S3-compatible bucket (AWS, DigitalOcean Spaces, MinIO).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    config: S3Config,
}

impl S3ObjectStore {
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        // Validate required fields
        if config.bucket_name.is_empty() {
            return Err(StorageError::Configuration("Bucket name is required".to_string()));
        }
        if config.access_key_id.is_empty() {
            return Err(StorageError::Configuration("Access key ID is required".to_string()));
        }
        if config.secret_access_key.is_empty() {
            return Err(StorageError::Configuration("Secret access key is required".to_string()));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None, // session token
            None, // expiry
            "taketemp-env",
        );

        let region = if config.region.is_empty() {
            "us-east-1".to_string()
        } else {
            config.region.clone()
        };

        // A failed put fails the submission; the SDK must not retry behind our back.
        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .region(AwsRegion::new(region))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .force_path_style(config.force_path_style)
            .behavior_version_latest();

        if let Some(endpoint_url) = &config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
            info!("Using custom S3 endpoint: {}", endpoint_url);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError> {
        info!(
            "Storing object to S3: {}/{} ({} bytes)",
            self.config.bucket_name, key, content_length
        );

        let content_length = i64::try_from(content_length)
            .map_err(|_| StorageError::Request {
                key: key.to_string(),
                message: format!("content length {} out of range", content_length),
            })?;

        self.client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .content_length(content_length)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!("Failed to store object {}: {}", key, message);
                StorageError::Request {
                    key: key.to_string(),
                    message,
                }
            })?;

        info!("Successfully stored object: {}", key);
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "s3"
    }

    async fn initialize(&self) -> Result<(), StorageError> {
        info!(
            "S3 object store ready for bucket {} in {}",
            self.config.bucket_name, self.config.region
        );
        Ok(())
    }
}
