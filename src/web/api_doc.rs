use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::flights::list_statuses,
        super::api::flights::list_tracks,
        super::api::ingest::status,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::status::FlightStatus,
            crate::status::TrackListing,
            crate::ingest::IngestStatus,
            crate::ingest::IngestPhase,
            crate::ingest::TickReport,
        )
    ),
    info(
        title = "Who's Up There API",
        description = "Proximity status of aircraft around a fixed observer",
        version = "0.1.0"
    ),
    tags(
        (name = "flights", description = "Flight status and track listing"),
        (name = "ingest", description = "Feed ingestion")
    )
)]
pub struct ApiDoc;
