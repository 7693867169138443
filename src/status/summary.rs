use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::observation::Observation;

/// Closest-approach and latest-position facts for one aircraft in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub latest: Observation,
    /// Distance of the second-most-recent observation.
    pub previous_distance: Option<f64>,
    pub min_distance: f64,
    /// Earliest time the minimum distance was seen.
    pub min_distance_at: DateTime<Utc>,
}

impl TrackSummary {
    /// Folds one aircraft's observations, which must be in capture order.
    /// Returns `None` for an empty sequence.
    pub fn fold<I>(observations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut iter = observations.into_iter();
        let first = iter.next()?;
        let mut summary = TrackSummary {
            previous_distance: None,
            min_distance: first.distance,
            min_distance_at: first.captured_at,
            latest: first,
        };

        for observation in iter {
            // strict: an equal distance later on keeps the earlier time
            if observation.distance < summary.min_distance {
                summary.min_distance = observation.distance;
                summary.min_distance_at = observation.captured_at;
            }
            summary.previous_distance = Some(summary.latest.distance);
            summary.latest = observation;
        }

        Some(summary)
    }
}

/// Groups observations by aircraft and orders each group by capture time.
pub fn group_by_aircraft<I>(observations: I) -> BTreeMap<String, Vec<Observation>>
where
    I: IntoIterator<Item = Observation>,
{
    let mut groups: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for observation in observations {
        groups
            .entry(observation.aircraft_id.clone())
            .or_default()
            .push(observation);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|o| o.captured_at);
    }
    groups
}

/// One summary per aircraft, in aircraft id order.
pub fn summarize<I>(observations: I) -> Vec<TrackSummary>
where
    I: IntoIterator<Item = Observation>,
{
    group_by_aircraft(observations)
        .into_values()
        .filter_map(TrackSummary::fold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn track(id: &str, points: &[(i64, f64)]) -> Vec<Observation> {
        points
            .iter()
            .map(|&(minute, distance)| Observation::new(id, at(minute), distance))
            .collect()
    }

    #[test]
    fn single_observation_has_no_previous() {
        let summary = TrackSummary::fold(track("a1", &[(0, 3.0)])).unwrap();
        assert_eq!(summary.previous_distance, None);
        assert_eq!(summary.min_distance, 3.0);
        assert_eq!(summary.min_distance_at, at(0));
        assert!(TrackSummary::fold(Vec::new()).is_none());
    }

    #[test]
    fn minimum_tie_resolves_to_earliest() {
        let summary =
            TrackSummary::fold(track("a1", &[(0, 6.0), (1, 4.0), (2, 5.0), (3, 4.0), (4, 7.0)]))
                .unwrap();
        assert_eq!(summary.min_distance, 4.0);
        assert_eq!(summary.min_distance_at, at(1));
        assert_eq!(summary.latest.captured_at, at(4));
        assert_eq!(summary.previous_distance, Some(4.0));
    }

    #[test]
    fn grouping_orders_each_track() {
        let mut rows = track("b2", &[(3, 2.0), (1, 4.0)]);
        rows.extend(track("a1", &[(2, 1.0), (0, 3.0)]));

        let summaries = summarize(rows);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].latest.aircraft_id, "a1");
        assert_eq!(summaries[0].latest.distance, 1.0);
        assert_eq!(summaries[0].previous_distance, Some(3.0));
        assert_eq!(summaries[1].latest.aircraft_id, "b2");
        assert_eq!(summaries[1].latest.captured_at, at(3));
        assert_eq!(summaries[1].previous_distance, Some(4.0));
    }
}
