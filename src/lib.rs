//! Temperature self-report service.
//!
//! `POST /temperature` takes a multipart form with an optional photo, stores
//! the photo in object storage and then the record in Postgres.
//! `GET /temperature/{username}` returns that user's records with public
//! photo URLs.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, extract::Request, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::Level;

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod staging;
pub mod startup;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests;

use config::{Config, StorageBackendKind};
use db::RecordStore;
use storage::ObjectStore;

/// Process-wide dependencies, built once at startup and shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub record_store: Arc<dyn RecordStore>,
    pub object_store: Arc<dyn ObjectStore>,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size_bytes();

    let mut app = routes::router();

    // Photos written by the local backend are served back from the URL
    // the query endpoint composes for them
    if state.config.storage_backend == StorageBackendKind::Local {
        app = app.nest_service("/images", ServeDir::new(&state.config.local_storage_path));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|_request: &Request, _span: &tracing::Span| {
                    tracing::event!(Level::DEBUG, "received request");
                })
                .on_response(
                    |response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(
                            Level::INFO,
                            status = %response.status(),
                            latency = ?latency,
                            "request completed"
                        );
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::ERROR, error = %error, "request failed");
                    },
                ),
        )
        .with_state(state)
}
