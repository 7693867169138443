use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::phase::{rank_order, Phase};
use super::summary::summarize;
use super::types::{FlightStatus, TrackListing};
use crate::observation::{Observation, ObservationStore, StoreError, WindowQuery};

#[derive(Debug, Clone, Copy)]
pub struct StatusSettings {
    pub lookback: Duration,
    pub ceiling_km: f64,
}

impl Default for StatusSettings {
    fn default() -> Self {
        StatusSettings {
            lookback: Duration::minutes(30),
            ceiling_km: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackSettings {
    pub lookback: Duration,
    pub ceiling_km: f64,
    pub limit: usize,
}

impl Default for TrackSettings {
    fn default() -> Self {
        TrackSettings {
            lookback: Duration::hours(12),
            ceiling_km: 10.0,
            limit: 20,
        }
    }
}

/// Ranked status board for an already selected window of observations.
pub fn rank_statuses<I>(observations: I, now: DateTime<Utc>) -> Vec<FlightStatus>
where
    I: IntoIterator<Item = Observation>,
{
    let mut statuses: Vec<FlightStatus> = summarize(observations)
        .into_iter()
        .filter_map(|summary| {
            let phase = Phase::classify(&summary, now);
            phase.is_known().then(|| FlightStatus::new(summary, phase))
        })
        .collect();

    statuses.sort_by(|a, b| rank_order((a.status, a.time), (b.status, b.time)));
    statuses
}

/// The `limit` most recently seen tracks, newest first.
pub fn list_tracks<I>(observations: I, limit: usize) -> Vec<TrackListing>
where
    I: IntoIterator<Item = Observation>,
{
    let mut tracks: Vec<TrackListing> = summarize(observations)
        .into_iter()
        .map(TrackListing::from)
        .collect();

    tracks.sort_by(|a, b| b.latest_timestamp.cmp(&a.latest_timestamp));
    tracks.truncate(limit);
    tracks
}

/// Read side of the system. Holds no state between calls: the same stored
/// log and `now` always give the same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusProjector {
    pub status: StatusSettings,
    pub tracks: TrackSettings,
}

impl StatusProjector {
    pub fn new(status: StatusSettings, tracks: TrackSettings) -> Self {
        Self { status, tracks }
    }

    pub fn statuses(
        &self,
        store: &dyn ObservationStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<FlightStatus>, StoreError> {
        let query = WindowQuery::new(now, self.status.lookback).with_ceiling(self.status.ceiling_km);
        let statuses = rank_statuses(store.query_window(&query)?, now);
        debug!("Projected {} flight statuses at {}", statuses.len(), now);
        Ok(statuses)
    }

    pub fn track_listing(
        &self,
        store: &dyn ObservationStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrackListing>, StoreError> {
        let query = WindowQuery::new(now, self.tracks.lookback).with_ceiling(self.tracks.ceiling_km);
        Ok(list_tracks(store.query_window(&query)?, self.tracks.limit))
    }
}
