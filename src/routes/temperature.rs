use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};

use crate::{
    errors::{AppError, StagingError},
    models::{
        ErrorResponse, SubmitResponse, TemperatureForm, TemperatureRecord,
        TemperatureRecordResponse,
    },
    staging::{stage_multipart, StagedFile},
    storage::ObjectStore,
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/temperature", post(submit_temperature))
        .route("/temperature/{username}", get(list_temperatures))
}

#[utoipa::path(
    get,
    path = "/temperature/{username}",
    tag = "temperature",
    params(
        (
            "username" = String,
            Path,
            description = "Exact username the records were submitted under"
        )
    ),
    responses(
        (
            status = 200,
            description = "Records in submission order, numbered from 1",
            body = Vec<TemperatureRecordResponse>
        ),
        (status = 500, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn list_temperatures(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<TemperatureRecordResponse>>, AppError> {
    let records = state
        .record_store
        .find_by_user(&username)
        .await
        .map_err(|e| {
            error!("Failed to retrieve records for {}: {}", username, e);
            AppError::Query(e)
        })?;

    info!("Found {} temperature records for {}", records.len(), username);

    Ok(Json(TemperatureRecordResponse::from_records(
        &records,
        &state.config.public_base_url,
    )))
}

/// Multipart form with text fields `username`, `q1`, `q2`, `temperature`
/// and an optional photo in `temp-img`.
///
/// The photo is uploaded before the record is inserted, so a stored record
/// never points at a missing photo. The staged temp file is removed when the
/// handler returns, whatever the outcome.
#[utoipa::path(
    post,
    path = "/temperature",
    tag = "temperature",
    responses(
        (status = 200, description = "Record stored", body = SubmitResponse),
        (status = 500, description = "Staging, upload or database failure", body = ErrorResponse)
    )
)]
pub async fn submit_temperature(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let multipart = multipart.map_err(StagingError::from)?;
    let upload = stage_multipart(multipart, std::path::Path::new(&state.config.tmp_dir)).await?;

    let form = TemperatureForm::from_fields(&upload.fields);
    let record = TemperatureRecord::from_form(&form, upload.file.as_ref().map(|f| f.key.clone()));

    info!(
        "Received temperature submission from '{}' (photo: {})",
        record.username,
        upload.file.is_some()
    );

    if let Some(file) = &upload.file {
        upload_staged_photo(file, state.object_store.as_ref()).await?;
    }

    let inserted_id = state.record_store.insert_record(&record).await?;
    info!("Inserted temperature record {}", inserted_id);

    Ok(Json(SubmitResponse::inserted(inserted_id)))
}

/// Read the staged photo back from disk and hand it to the object store.
async fn upload_staged_photo(file: &StagedFile, store: &dyn ObjectStore) -> Result<(), AppError> {
    let data = file.read().await?;
    store
        .put_object(&file.key, data, &file.content_type, file.size)
        .await?;
    info!("Uploaded photo {} ({})", file.key, file.original_name);
    Ok(())
}
