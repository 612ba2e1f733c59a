//! Process configuration, read from the environment.
//!
//! Every setting has a default except the object store credentials, whose
//! presence is verified by the startup sequencer rather than here.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

/// Which object store implementation receives uploaded photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

impl FromStr for StorageBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            other => Err(anyhow!("Unknown storage backend '{}', expected 's3' or 'local'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub endpoint_url: Option<String>, // For S3-compatible services
    pub access_key_id: String,
    pub secret_access_key: String,
    pub force_path_style: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tmp_dir: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub storage_backend: StorageBackendKind,
    pub s3: S3Config,
    pub local_storage_path: String,
    pub public_base_url: String,
    pub max_upload_size_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_port(None)
    }

    /// Like [`Config::from_env`], with `port` taking precedence over `PORT`.
    pub fn from_env_with_port(port: Option<u16>) -> Result<Self> {
        Self::from_lookup_with_port(|key| std::env::var(key).ok(), port)
    }

    /// Build the configuration from any key lookup, so tests can avoid
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_port(lookup, None)
    }

    /// The port override is applied before anything derived from the port,
    /// such as the local backend's public base URL.
    pub fn from_lookup_with_port<F>(lookup: F, port_override: Option<u16>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match port_override {
            Some(port) => port,
            None => parse_or(&lookup, "PORT", 3000)?,
        };
        let storage_backend: StorageBackendKind =
            parse_or(&lookup, "STORAGE_BACKEND", StorageBackendKind::S3)?;
        let max_upload_size_mb: usize = parse_or(&lookup, "MAX_UPLOAD_SIZE_MB", 10)?;
        if max_upload_size_mb.checked_mul(1024 * 1024).is_none() {
            return Err(anyhow!(
                "Invalid MAX_UPLOAD_SIZE_MB value '{}': too large",
                max_upload_size_mb
            ));
        }

        let s3 = S3Config {
            bucket_name: lookup("S3_BUCKET").unwrap_or_else(|| "fsd-2020".to_string()),
            region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: lookup("S3_ENDPOINT").filter(|v| !v.trim().is_empty()),
            access_key_id: lookup("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            force_path_style: parse_or(&lookup, "S3_FORCE_PATH_STYLE", false)?,
        };

        let public_base_url = match lookup("PUBLIC_BASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => default_public_base_url(storage_backend, &s3, port),
        };

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            tmp_dir: lookup("TMP_DIR").unwrap_or_else(|| "temp".to_string()),
            database_url: database_url(&lookup)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            storage_backend,
            s3,
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| "uploads".to_string()),
            public_base_url,
            max_upload_size_mb,
        };

        info!(
            "Configuration: listen {}:{}, storage backend {:?}, temp dir {}",
            config.host, config.port, config.storage_backend, config.tmp_dir
        );

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request body limit in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} value '{}': {}", key, raw, e)),
        _ => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the individual
/// `POSTGRES_*` variables with local defaults.
fn database_url<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
            return Err(anyhow!(
                "Invalid database URL format: must start with postgresql:// or postgres://"
            ));
        }
        return Ok(url);
    }

    let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
    let db = lookup("POSTGRES_DB").unwrap_or_else(|| "taketemp".to_string());
    let user = lookup("POSTGRES_USER").unwrap_or_else(|| "taketemp".to_string());
    let password = lookup("POSTGRES_PASSWORD").unwrap_or_else(|| "taketemp".to_string());

    Ok(format!("postgresql://{}:{}@{}:{}/{}", user, password, host, port, db))
}

fn default_public_base_url(backend: StorageBackendKind, s3: &S3Config, port: u16) -> String {
    match backend {
        StorageBackendKind::Local => format!("http://localhost:{}/images", port),
        StorageBackendKind::S3 => match &s3.endpoint_url {
            Some(endpoint) => {
                let host = endpoint
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_end_matches('/');
                if s3.force_path_style {
                    format!("{}/{}", endpoint.trim_end_matches('/'), s3.bucket_name)
                } else {
                    format!("https://{}.{}", s3.bucket_name, host)
                }
            }
            None => {
                warn!("PUBLIC_BASE_URL not set, deriving it from the S3 bucket and region");
                format!("https://{}.s3.{}.amazonaws.com", s3.bucket_name, s3.region)
            }
        },
    }
}
