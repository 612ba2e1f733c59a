//! Error types for staging, object storage, persistence and startup.
//!
//! Request-level failures are wrapped in [`AppError`], which logs the full
//! error and answers the client with a short, stable message. Internal error
//! details never reach the response body.

use std::path::PathBuf;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Failures while accepting and staging the multipart submission.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("request is not a valid multipart submission: {0}")]
    Rejected(#[from] MultipartRejection),

    #[error("failed to read multipart field: {0}")]
    Multipart(#[from] MultipartError),

    #[error("unexpected file field '{0}'")]
    UnexpectedFile(String),

    #[error("staged file I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures from the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store request for '{key}' failed: {message}")]
    Request { key: String, message: String },

    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("object store I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("object store misconfigured: {0}")]
    Configuration(String),
}

/// Failures from the record store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Failures that keep the server from listening.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{0} not found in environment variables")]
    MissingCredentials(&'static str),

    #[error("failed to connect to database: {0}")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to prepare temp directory {}: {source}", .path.display())]
    TempDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize object store: {0}")]
    Storage(#[from] StorageError),
}

/// Request-level error, converted into a 500 response at the handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("query failed: {0}")]
    Query(#[source] PersistenceError),
}

impl AppError {
    /// Message returned to the client for this kind of failure.
    pub fn client_message(&self) -> &'static str {
        match self {
            AppError::Staging(_) => "failed to stage upload",
            AppError::Storage(_) => "failed to store photo",
            AppError::Persistence(_) => "failed to save record",
            AppError::Query(_) => "failed to retrieve records",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);

        let body = ErrorResponse {
            error: self.client_message().to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
