use crate::error::{Error, Result};

use geo_types::Point;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub alt: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinate(
                format!("latitude {} out of range", lat)));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidCoordinate(
                format!("longitude {} out of range", lng)));
        }

        Ok(Self {
            lat: lat,
            lng: lng,
            alt: None,
        })
    }

    pub fn with_alt(mut self, alt: Option<f64>) -> Self {
        self.alt = alt;
        self
    }

    // Track files (KML, GeoJSON style) store points as [lng, lat, alt?]
    pub fn from_lng_lat(values: &[f64]) -> Result<Self> {
        match values {
            [lng, lat] => GeoPoint::new(*lat, *lng),
            [lng, lat, alt, ..] => {
                Ok(GeoPoint::new(*lat, *lng)?.with_alt(Some(*alt)))
            },
            _ => Err(Error::InvalidCoordinate(
                format!("expected lng,lat[,alt], got {} values",
                        values.len()))),
        }
    }

    // "lat,lng" at full precision, as sent to the photo service.
    pub fn location_string(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }

    pub fn display_string(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }

    pub fn alt_or_zero(&self) -> f64 {
        self.alt.unwrap_or(0.0)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alt {
            Some(alt) => write!(formatter, "({:.6}, {:.6}, {}m)",
                                self.lat, self.lng, alt),
            None => write!(formatter, "({:.6}, {:.6})", self.lat, self.lng),
        }
    }
}

// Parses "lat,lng" as given on the command line
impl FromStr for GeoPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|_| Error::InvalidCoordinate(
                format!("expected 'lat,lng', got '{}'", s)))?;

        match parts[..] {
            [lat, lng] => GeoPoint::new(lat, lng),
            _ => Err(Error::InvalidCoordinate(
                format!("expected 'lat,lng', got '{}'", s))),
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl TryFrom<Point<f64>> for GeoPoint {
    type Error = Error;

    fn try_from(p: Point<f64>) -> Result<Self> {
        GeoPoint::new(p.y(), p.x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.1).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn parses_lat_lng_pair() {
        let p: GeoPoint = "40.4506, -79.9355".parse().unwrap();
        assert_eq!(p.lat, 40.4506);
        assert_eq!(p.lng, -79.9355);
        assert_eq!(p.alt, None);

        assert!("40.45".parse::<GeoPoint>().is_err());
        assert!("north,west".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn lng_lat_order_from_tracks() {
        let p = GeoPoint::from_lng_lat(&[-79.935, 40.450, 281.0]).unwrap();
        assert_eq!(p.lat, 40.450);
        assert_eq!(p.lng, -79.935);
        assert_eq!(p.alt, Some(281.0));
        assert!(GeoPoint::from_lng_lat(&[1.0]).is_err());
    }

    #[test]
    fn location_strings() {
        let p = GeoPoint::new(40.44416469999999, -79.94337251).unwrap();
        assert_eq!(p.location_string(), "40.44416469999999,-79.94337251");
        assert_eq!(p.display_string(), "40.444165,-79.943373");
    }

    #[test]
    fn geo_types_round_trip_keeps_axes() {
        let p = GeoPoint::new(40.0, -79.0).unwrap();
        let gp: Point<f64> = p.into();
        assert_eq!(gp.x(), -79.0);
        assert_eq!(gp.y(), 40.0);
        assert_eq!(GeoPoint::try_from(gp).unwrap(), p);
    }
}
