use axum::extract::State;

use crate::web::api::error::ApiResult;
use crate::web::state::AppState;

use super::templates::{StatusTemplate, TracksTemplate};

pub async fn status_board(State(state): State<AppState>) -> ApiResult<StatusTemplate> {
    let statuses = state
        .query(|store, projector, now| projector.statuses(store, now))
        .await?;
    Ok(StatusTemplate {
        rows: statuses.into_iter().map(Into::into).collect(),
    })
}

pub async fn tracks(State(state): State<AppState>) -> ApiResult<TracksTemplate> {
    let tracks = state
        .query(|store, projector, now| projector.track_listing(store, now))
        .await?;
    Ok(TracksTemplate {
        rows: tracks.into_iter().map(Into::into).collect(),
    })
}
