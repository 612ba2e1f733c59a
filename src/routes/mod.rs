use std::sync::Arc;

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::{
    models::{ErrorResponse, SubmitResponse, TemperatureRecordResponse},
    AppState,
};

pub mod health;
pub mod temperature;

#[derive(OpenApi)]
#[openapi(
    paths(
        temperature::list_temperatures,
        temperature::submit_temperature,
        health::health_check,
    ),
    components(schemas(SubmitResponse, TemperatureRecordResponse, ErrorResponse)),
    tags(
        (name = "temperature", description = "Temperature self-reports"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(temperature::router())
        .merge(health::router())
        .route("/api-docs/openapi.json", get(openapi_json))
}
