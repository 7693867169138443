use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

use super::error::{FeedError, FieldDecodeError, UnusableRecord};
use super::types::{AircraftSnapshot, FeedResponse, FeedSnapshot};
use crate::geo::ObserverPoint;
use crate::observation::{Altitude, Observation};

const GROUND: &str = "ground";

/// Decodes a whole feed body. Any structural problem fails the batch.
pub fn decode_snapshot(body: &[u8]) -> Result<FeedSnapshot, FeedError> {
    let response: FeedResponse = serde_json::from_slice(body)?;
    let captured_at =
        DateTime::from_timestamp_millis(response.now).ok_or(FeedError::Timestamp(response.now))?;
    Ok(FeedSnapshot {
        captured_at,
        aircraft: response.ac,
    })
}

/// `"ground"` first, then an integer number of feet, anything else fails.
pub fn decode_altitude(value: &Value) -> Result<Altitude, FieldDecodeError> {
    match value {
        Value::String(s) if s == GROUND => Ok(Altitude::Ground),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ft| i32::try_from(ft).ok())
            .map(Altitude::Feet)
            .ok_or_else(|| FieldDecodeError::Altitude(value.to_string())),
        other => Err(FieldDecodeError::Altitude(other.to_string())),
    }
}

impl AircraftSnapshot {
    /// Converts a feed entry into a stored row. An undecodable altitude is
    /// logged and left empty. When the feed omits the distance it is
    /// computed from the position; an entry with neither is unusable, as is
    /// one without an identity.
    pub fn into_observation(
        self,
        captured_at: DateTime<Utc>,
        observer: Option<&ObserverPoint>,
    ) -> Result<Observation, UnusableRecord> {
        let aircraft_id = match self.hex {
            Some(hex) if !hex.is_empty() => hex,
            _ => return Err(UnusableRecord::MissingIdentity),
        };

        let altitude = match self.alt_baro.as_ref().filter(|v| !v.is_null()) {
            Some(raw) => match decode_altitude(raw) {
                Ok(altitude) => Some(altitude),
                Err(e) => {
                    warn!("{}: {}", aircraft_id, e);
                    None
                }
            },
            None => None,
        };

        let distance = match (self.dst, self.lat, self.lon, observer) {
            (Some(dst), _, _, _) => dst,
            (None, Some(lat), Some(lon), Some(observer)) => observer.distance_km(lat, lon),
            _ => return Err(UnusableRecord::MissingDistance(aircraft_id)),
        };

        Ok(Observation {
            captured_at,
            aircraft_id,
            message_type: self.message_type.unwrap_or_default(),
            flight_number: self
                .flight
                .map(|f| f.trim().to_string())
                .unwrap_or_default(),
            registration: self.registration.unwrap_or_default(),
            aircraft_type: self.aircraft_type.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            operator: self.operator.unwrap_or_default(),
            manufacture_year: self.year.unwrap_or_default(),
            altitude,
            ground_speed: self.gs.unwrap_or_default(),
            wind_direction: self.wd.unwrap_or_default(),
            wind_speed: self.ws.unwrap_or_default(),
            track_angle: self.track.unwrap_or_default(),
            latitude: self.lat.unwrap_or_default(),
            longitude: self.lon.unwrap_or_default(),
            position_age: self.seen_pos.unwrap_or_default(),
            distance,
            direction: self.dir.unwrap_or_default(),
        })
    }
}
