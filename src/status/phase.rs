use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use super::summary::TrackSummary;

/// Motion phase of a track relative to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Approaching,
    AtClosestPoint,
    /// Whole minutes since the closest approach.
    PassedOver { minutes: i64 },
    Unknown,
}

impl Phase {
    /// First matching rule wins. A track seen only once has no motion to
    /// classify.
    pub fn classify(summary: &TrackSummary, now: DateTime<Utc>) -> Phase {
        let Some(previous) = summary.previous_distance else {
            return Phase::Unknown;
        };
        let latest = summary.latest.distance;

        if latest == summary.min_distance {
            Phase::AtClosestPoint
        } else if latest > summary.min_distance && latest > previous {
            Phase::PassedOver {
                minutes: minutes_since(summary.min_distance_at, now),
            }
        } else if latest < previous {
            Phase::Approaching
        } else {
            Phase::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Phase::Unknown)
    }

    fn class(&self) -> u8 {
        match self {
            Phase::Approaching | Phase::AtClosestPoint => 0,
            Phase::PassedOver { .. } => 1,
            Phase::Unknown => 2,
        }
    }
}

fn minutes_since(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((now - at).num_milliseconds() as f64 / 60_000.0).round() as i64
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Approaching => write!(f, "Approaching"),
            Phase::AtClosestPoint => write!(f, "At Closest Point"),
            Phase::PassedOver { minutes } => write!(f, "Passed Over {} mins ago", minutes),
            Phase::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Orders two classified tracks. Approaching and closest-point tracks come
/// first, earliest latest sighting first; passed tracks follow, most
/// recently passed first.
pub fn rank_order(
    a: (Phase, DateTime<Utc>),
    b: (Phase, DateTime<Utc>),
) -> Ordering {
    a.0.class().cmp(&b.0.class()).then_with(|| match (a.0, b.0) {
        (Phase::PassedOver { minutes: x }, Phase::PassedOver { minutes: y }) => x.cmp(&y),
        _ => a.1.cmp(&b.1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    /// Summary of the first `upto` points of a track, classified at the
    /// time of its last point.
    fn phase_of(points: &[(i64, f64)], upto: usize) -> Phase {
        let rows: Vec<_> = points[..upto]
            .iter()
            .map(|&(minute, d)| Observation::new("a1", at(minute), d))
            .collect();
        let now = rows[rows.len() - 1].captured_at;
        Phase::classify(&TrackSummary::fold(rows).unwrap(), now)
    }

    #[test]
    fn flyover_sequence() {
        let points = [(0, 8.0), (2, 6.0), (4, 4.0), (6, 6.0), (8, 8.0)];
        assert_eq!(phase_of(&points, 2), Phase::AtClosestPoint);
        assert_eq!(phase_of(&points, 3), Phase::AtClosestPoint);
        assert_eq!(phase_of(&points, 4), Phase::PassedOver { minutes: 2 });
        assert_eq!(phase_of(&points, 5), Phase::PassedOver { minutes: 4 });
    }

    #[test]
    fn decreasing_track_ties_its_minimum() {
        let points = [(0, 9.0), (1, 7.0), (2, 5.0)];
        assert_eq!(phase_of(&points, 3), Phase::AtClosestPoint);
    }

    #[test]
    fn approaching_after_earlier_closer_pass() {
        // closest at 2.0, went out to 9.0 and is now coming back in
        let points = [(0, 2.0), (1, 9.0), (2, 7.0)];
        assert_eq!(phase_of(&points, 3), Phase::Approaching);
    }

    #[test]
    fn single_observation_is_unknown() {
        let rows = vec![Observation::new("a1", at(0), 3.0)];
        let summary = TrackSummary::fold(rows).unwrap();
        assert_eq!(Phase::classify(&summary, at(0)), Phase::Unknown);
        assert!(!Phase::classify(&summary, at(0)).is_known());
    }

    #[test]
    fn flat_track_above_minimum_is_unknown() {
        let points = [(0, 2.0), (1, 6.0), (2, 6.0)];
        assert_eq!(phase_of(&points, 3), Phase::Unknown);
    }

    #[test]
    fn minutes_round_to_nearest() {
        assert_eq!(minutes_since(at(0), at(0) + Duration::seconds(89)), 1);
        assert_eq!(minutes_since(at(0), at(0) + Duration::seconds(90)), 2);
        assert_eq!(minutes_since(at(0), at(0) + Duration::seconds(29)), 0);
    }

    #[test]
    fn labels() {
        assert_eq!(Phase::Approaching.to_string(), "Approaching");
        assert_eq!(Phase::AtClosestPoint.to_string(), "At Closest Point");
        assert_eq!(
            Phase::PassedOver { minutes: 3 }.to_string(),
            "Passed Over 3 mins ago"
        );
        assert_eq!(
            serde_json::to_string(&Phase::PassedOver { minutes: 12 }).unwrap(),
            "\"Passed Over 12 mins ago\""
        );
    }
}
