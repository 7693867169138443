use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::phase::Phase;
use super::summary::TrackSummary;

/// One ranked row of the status board.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FlightStatus {
    pub aircraft_id: String,
    pub flight_number: String,
    pub registration: String,
    pub aircraft_type: String,
    pub operator: String,
    /// Latest distance from the observer, km.
    pub distance: f64,
    #[schema(value_type = String, example = "Passed Over 3 mins ago")]
    pub status: Phase,
    /// Capture time of the latest observation.
    pub time: DateTime<Utc>,
}

impl FlightStatus {
    pub fn new(summary: TrackSummary, status: Phase) -> Self {
        let latest = summary.latest;
        FlightStatus {
            aircraft_id: latest.aircraft_id,
            flight_number: latest.flight_number,
            registration: latest.registration,
            aircraft_type: latest.aircraft_type,
            operator: latest.operator,
            distance: latest.distance,
            status,
            time: latest.captured_at,
        }
    }
}

/// Closest approach and latest sighting of one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrackListing {
    pub aircraft_id: String,
    pub flight_number: String,
    pub latest_distance: f64,
    pub latest_timestamp: DateTime<Utc>,
    pub min_distance: f64,
    pub min_distance_timestamp: DateTime<Utc>,
}

impl From<TrackSummary> for TrackListing {
    fn from(summary: TrackSummary) -> Self {
        TrackListing {
            aircraft_id: summary.latest.aircraft_id,
            flight_number: summary.latest.flight_number,
            latest_distance: summary.latest.distance,
            latest_timestamp: summary.latest.captured_at,
            min_distance: summary.min_distance,
            min_distance_timestamp: summary.min_distance_at,
        }
    }
}
