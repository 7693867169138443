use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body returned by the point query. Fields not listed are ignored.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub ac: Vec<AircraftSnapshot>,
    /// Capture time of the snapshot, unix millis.
    pub now: i64,
}

/// One aircraft entry. Every field may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftSnapshot {
    pub hex: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub flight: Option<String>,
    #[serde(rename = "r")]
    pub registration: Option<String>,
    #[serde(rename = "t")]
    pub aircraft_type: Option<String>,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    #[serde(rename = "ownOp")]
    pub operator: Option<String>,
    pub year: Option<String>,
    /// Either a number of feet or the string `"ground"`.
    pub alt_baro: Option<serde_json::Value>,
    pub gs: Option<f64>,
    pub wd: Option<i32>,
    pub ws: Option<i32>,
    pub track: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub seen_pos: Option<f64>,
    pub dst: Option<f64>,
    pub dir: Option<f64>,
}

/// A decoded snapshot: every aircraft shares the feed's capture time.
#[derive(Debug)]
pub struct FeedSnapshot {
    pub captured_at: DateTime<Utc>,
    pub aircraft: Vec<AircraftSnapshot>,
}
