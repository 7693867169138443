use axum::{extract::State, Json};

use crate::ingest::IngestStatus;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/ingest/status",
    responses(
        (status = 200, description = "Ingestion loop status", body = IngestStatus),
        (status = 404, description = "Ingestion not running in this process", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<IngestStatus>> {
    let monitor = state
        .ingest
        .as_ref()
        .ok_or(ApiError::NotFound("ingest_disabled"))?;
    Ok(Json(monitor.status()))
}
