use std::fmt;

use geo::{HaversineDistance, Point as GeoPoint};

/// Used until a GPS fix, tap or stored address provides something better.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 0.3476,
    longitude: 32.5825,
};

pub const LATITUDE_DELTA: f64 = 0.0922;
pub const LONGITUDE_DELTA: f64 = 0.0421;

/// True iff both values are finite and inside the WGS84 ranges.
/// (0, 0) is a legal point, not a marker for "unset".
pub fn is_valid(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite() && longitude.is_finite() && latitude >= -90.0 && latitude <= 90.0 && longitude >= -180.0 && longitude <= 180.0
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn validated(latitude: f64, longitude: f64) -> Option<Self> {
        if is_valid(latitude, longitude) {
            Some(Self::new(latitude, longitude))
        } else {
            None
        }
    }

    /// Parses the two manual entry fields. Blank or malformed text is invalid.
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim().parse::<f64>().ok()?;
        let longitude = longitude.trim().parse::<f64>().ok()?;
        Self::validated(latitude, longitude)
    }

    pub fn is_valid(&self) -> bool {
        is_valid(self.latitude, self.longitude)
    }

    /// Text rendering used to seed the manual entry fields.
    pub fn to_text(&self) -> (String, String) {
        (self.latitude.to_string(), self.longitude.to_string())
    }

    /// Great-circle distance in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let from: GeoPoint<f64> = (*self).into();
        let to: GeoPoint<f64> = (*other).into();
        from.haversine_distance(&to)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl From<Coordinate> for GeoPoint<f64> {
    fn from(coordinate: Coordinate) -> Self {
        GeoPoint::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<GeoPoint<f64>> for Coordinate {
    fn from(point: GeoPoint<f64>) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

/// Visible map area: a center plus zoom spans.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    #[serde(flatten)]
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Region set programmatically always uses the fixed spans.
    pub fn around(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: LATITUDE_DELTA,
            longitude_delta: LONGITUDE_DELTA,
        }
    }

    /// Same spans, new center.
    pub fn recenter(&self, center: Coordinate) -> Self {
        Self { center, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64;

    #[test]
    fn boundaries_and_origin_are_valid() {
        assert!(is_valid(90.0, 180.0));
        assert!(is_valid(-90.0, -180.0));
        assert!(is_valid(0.0, 0.0));
        assert!(is_valid(DEFAULT_COORDINATE.latitude, DEFAULT_COORDINATE.longitude));
    }

    #[test]
    fn out_of_range_and_non_finite_are_invalid() {
        assert!(!is_valid(90.0001, 0.0));
        assert!(!is_valid(0.0, -180.5));
        assert!(!is_valid(f64::NAN, 0.0));
        assert!(!is_valid(0.0, f64::NAN));
        assert!(!is_valid(f64::INFINITY, 0.0));
        assert!(!is_valid(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn parses_manual_entry() {
        assert_eq!(Coordinate::parse(" 0.35 ", "32.58"), Some(Coordinate::new(0.35, 32.58)));
        assert_eq!(Coordinate::parse("0", "0"), Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(Coordinate::parse("", "32.58"), None);
        assert_eq!(Coordinate::parse("abc", "32.58"), None);
        assert_eq!(Coordinate::parse("91", "32.58"), None);
        assert_eq!(Coordinate::parse("NaN", "32.58"), None);
    }

    #[test]
    fn text_rendering_is_shortest_form() {
        let (lat, lng) = Coordinate::new(0.3, 32.6).to_text();
        assert_eq!(lat, "0.3");
        assert_eq!(lng, "32.6");
    }

    #[test]
    fn geo_point_uses_longitude_as_x() {
        let point: GeoPoint<f64> = Coordinate::new(1.5, 30.0).into();
        assert_eq!(point.x(), 30.0);
        assert_eq!(point.y(), 1.5);
        assert_eq!(Coordinate::from(point), Coordinate::new(1.5, 30.0));
    }

    #[test]
    fn distance_of_one_degree_latitude() {
        let metres = Coordinate::new(0.0, 32.0).distance_to(&Coordinate::new(1.0, 32.0));
        assert!(metres > 110_000.0 && metres < 112_000.0);
    }

    #[test]
    fn region_uses_fixed_spans() {
        let region = MapRegion::around(Coordinate::new(1.0, 2.0));
        assert_eq!(region.latitude_delta, 0.0922);
        assert_eq!(region.longitude_delta, 0.0421);
    }
}
