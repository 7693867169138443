use askama::Template;
use askama_web::WebTemplate;

use crate::status::{FlightStatus, TrackListing};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Display-ready row; distances carry two decimals.
pub struct StatusRow {
    pub flight_number: String,
    pub registration: String,
    pub aircraft_type: String,
    pub operator: String,
    pub status: String,
    pub distance: String,
    pub time: String,
}

impl From<FlightStatus> for StatusRow {
    fn from(s: FlightStatus) -> Self {
        StatusRow {
            flight_number: s.flight_number,
            registration: s.registration,
            aircraft_type: s.aircraft_type,
            operator: s.operator,
            status: s.status.to_string(),
            distance: format!("{:.2}", s.distance),
            time: s.time.format(TIME_FORMAT).to_string(),
        }
    }
}

pub struct TrackRow {
    pub aircraft_id: String,
    pub flight_number: String,
    pub latest_distance: String,
    pub latest_timestamp: String,
    pub min_distance: String,
    pub min_distance_timestamp: String,
}

impl From<TrackListing> for TrackRow {
    fn from(t: TrackListing) -> Self {
        TrackRow {
            aircraft_id: t.aircraft_id,
            flight_number: t.flight_number,
            latest_distance: format!("{:.2}", t.latest_distance),
            latest_timestamp: t.latest_timestamp.format(TIME_FORMAT).to_string(),
            min_distance: format!("{:.2}", t.min_distance),
            min_distance_timestamp: t.min_distance_timestamp.format(TIME_FORMAT).to_string(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub rows: Vec<StatusRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "tracks.html")]
pub struct TracksTemplate {
    pub rows: Vec<TrackRow>,
}
