use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use super::error::StoreError;
use super::types::Observation;

/// Observations ordered by aircraft id, then capture time ascending.
pub type Observations = std::vec::IntoIter<Observation>;

/// A trailing time window over the log, optionally restricted to aircraft
/// that came within `distance_ceiling` km at least once inside it.
#[derive(Debug, Clone, Copy)]
pub struct WindowQuery {
    pub now: DateTime<Utc>,
    pub lookback: Duration,
    pub distance_ceiling: Option<f64>,
}

impl WindowQuery {
    pub fn new(now: DateTime<Utc>, lookback: Duration) -> Self {
        WindowQuery {
            now,
            lookback,
            distance_ceiling: None,
        }
    }

    pub fn with_ceiling(mut self, ceiling_km: f64) -> Self {
        self.distance_ceiling = Some(ceiling_km);
        self
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.now - self.lookback
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at <= self.now
    }
}

/// Append-only log of aircraft observations.
///
/// Implementations must allow one writer and any number of concurrent
/// readers, and a reader must never see a partially written row.
pub trait ObservationStore: Send + Sync {
    fn append(&self, observation: &Observation) -> Result<(), StoreError>;

    /// All in-window observations of every qualifying aircraft. An aircraft
    /// qualifies when any one of its in-window observations is under the
    /// ceiling; all of its in-window rows are returned, not only those.
    fn query_window(&self, query: &WindowQuery) -> Result<Observations, StoreError>;
}

/// Applies a window query to an unordered set of rows.
pub fn select_window<I>(rows: I, query: &WindowQuery) -> Observations
where
    I: IntoIterator<Item = Observation>,
{
    let mut selected: Vec<Observation> = rows
        .into_iter()
        .filter(|o| query.contains(o.captured_at))
        .collect();

    if let Some(ceiling) = query.distance_ceiling {
        let qualifying: HashSet<String> = selected
            .iter()
            .filter(|o| o.distance < ceiling)
            .map(|o| o.aircraft_id.clone())
            .collect();
        selected.retain(|o| qualifying.contains(&o.aircraft_id));
    }

    selected.sort_by(|a, b| {
        a.aircraft_id
            .cmp(&b.aircraft_id)
            .then(a.captured_at.cmp(&b.captured_at))
    });
    selected.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let query = WindowQuery::new(at(30), Duration::minutes(30));
        assert!(query.contains(at(0)));
        assert!(query.contains(at(30)));
        assert!(!query.contains(at(-1)));
        assert!(!query.contains(at(31)));
    }

    #[test]
    fn ceiling_qualifies_whole_aircraft() {
        let rows = vec![
            Observation::new("b2", at(5), 12.0),
            Observation::new("a1", at(3), 9.0),
            Observation::new("a1", at(1), 4.0),
            Observation::new("a1", at(2), 6.0),
            Observation::new("c3", at(4), 7.0),
        ];
        let query = WindowQuery::new(at(10), Duration::minutes(30)).with_ceiling(5.0);
        let selected: Vec<_> = select_window(rows, &query).collect();

        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|o| o.aircraft_id == "a1"));
        let times: Vec<_> = selected.iter().map(|o| o.captured_at).collect();
        assert_eq!(times, vec![at(1), at(2), at(3)]);
    }

    #[test]
    fn qualifying_row_must_be_inside_window() {
        let rows = vec![
            Observation::new("a1", at(-40), 1.0),
            Observation::new("a1", at(5), 8.0),
        ];
        let query = WindowQuery::new(at(10), Duration::minutes(30)).with_ceiling(5.0);
        assert_eq!(select_window(rows, &query).count(), 0);
    }

    #[test]
    fn ordered_by_aircraft_then_time() {
        let rows = vec![
            Observation::new("b2", at(2), 1.0),
            Observation::new("a1", at(4), 1.0),
            Observation::new("b2", at(1), 1.0),
            Observation::new("a1", at(3), 1.0),
        ];
        let query = WindowQuery::new(at(10), Duration::minutes(30));
        let keys: Vec<_> = select_window(rows, &query)
            .map(|o| (o.aircraft_id, o.captured_at))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a1".to_string(), at(3)),
                ("a1".to_string(), at(4)),
                ("b2".to_string(), at(1)),
                ("b2".to_string(), at(2)),
            ]
        );
    }
}
