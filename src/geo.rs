pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Fixed ground location that radius and distances are measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl ObserverPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&latitude_deg) || !(-180.0..=180.0).contains(&longitude_deg) {
            return None;
        }
        Some(Self {
            latitude_deg,
            longitude_deg,
        })
    }

    /// Parses `"lat, lon"`.
    pub fn from_coordinates(coordinates: &str) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Self::new(lat, lon)
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Haversine distance to a point, in km.
    pub fn distance_km(&self, latitude_deg: f64, longitude_deg: f64) -> f64 {
        let lat = latitude_deg.to_radians();
        let dlat = lat - self.lat_rad();
        let dlon = longitude_deg.to_radians() - self.lon_rad();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat_rad().cos() * lat.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        let p = ObserverPoint::from_coordinates(" 51.47, -0.4543 ").unwrap();
        assert_eq!(p.latitude_deg, 51.47);
        assert_eq!(p.longitude_deg, -0.4543);
        assert!(ObserverPoint::from_coordinates("51.47").is_none());
        assert!(ObserverPoint::from_coordinates("91.0, 0.0").is_none());
        assert!(ObserverPoint::from_coordinates("a, b").is_none());
    }

    #[test]
    fn one_degree_of_latitude() {
        let p = ObserverPoint::new(0.0, 0.0).unwrap();
        let d = p.distance_km(1.0, 0.0);
        assert!((d - 111.19).abs() < 0.05, "got {d}");
        assert_eq!(p.distance_km(0.0, 0.0), 0.0);
    }
}
