use axum::{extract::State, Json};

use crate::status::{FlightStatus, TrackListing};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Ranked status of nearby flights", body = Vec<FlightStatus>),
        (status = 500, description = "Store query failed", body = ErrorResponse),
        (status = 503, description = "Query timed out", body = ErrorResponse)
    ),
    tag = "flights"
)]
pub async fn list_statuses(State(state): State<AppState>) -> ApiResult<Json<Vec<FlightStatus>>> {
    let statuses = state
        .query(|store, projector, now| projector.statuses(store, now))
        .await?;
    Ok(Json(statuses))
}

#[utoipa::path(
    get,
    path = "/api/flights",
    responses(
        (status = 200, description = "Most recently seen tracks", body = Vec<TrackListing>),
        (status = 500, description = "Store query failed", body = ErrorResponse),
        (status = 503, description = "Query timed out", body = ErrorResponse)
    ),
    tag = "flights"
)]
pub async fn list_tracks(State(state): State<AppState>) -> ApiResult<Json<Vec<TrackListing>>> {
    let tracks = state
        .query(|store, projector, now| projector.track_listing(store, now))
        .await?;
    Ok(Json(tracks))
}
