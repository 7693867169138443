use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Barometric altitude as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Altitude {
    Ground,
    Feet(i32),
}

impl Altitude {
    pub fn is_ground(&self) -> bool {
        matches!(self, Altitude::Ground)
    }

    /// Altitude in feet, zero when on the ground.
    pub fn feet(&self) -> i32 {
        match self {
            Altitude::Ground => 0,
            Altitude::Feet(ft) => *ft,
        }
    }
}

/// One aircraft as seen in one feed snapshot. Never modified once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Observation {
    pub captured_at: DateTime<Utc>,
    pub aircraft_id: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub registration: String,
    #[serde(default)]
    pub aircraft_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub manufacture_year: String,
    pub altitude: Option<Altitude>,
    pub ground_speed: f64,
    pub wind_direction: i32,
    pub wind_speed: i32,
    pub track_angle: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub position_age: f64,
    /// Great-circle distance from the observer in km.
    pub distance: f64,
    pub direction: f64,
}

impl Observation {
    /// Bare observation carrying only identity, time and distance.
    pub fn new(aircraft_id: impl Into<String>, captured_at: DateTime<Utc>, distance: f64) -> Self {
        Observation {
            captured_at,
            aircraft_id: aircraft_id.into(),
            message_type: String::new(),
            flight_number: String::new(),
            registration: String::new(),
            aircraft_type: String::new(),
            description: String::new(),
            operator: String::new(),
            manufacture_year: String::new(),
            altitude: None,
            ground_speed: 0.0,
            wind_direction: 0,
            wind_speed: 0,
            track_angle: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            position_age: 0.0,
            distance,
            direction: 0.0,
        }
    }
}
