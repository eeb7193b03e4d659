use crate::cache::AddressCache;
use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::samples::{Segment, SampleSet};
use crate::services::{DirectionsService, Geocoder, Leg, TravelMode};
use crate::track;

use chrono::Utc;
use lazy_regex::regex_captures;
use log::{debug, info};
use std::path::Path;

pub fn resolve_address(address: &str, geocoder: &dyn Geocoder,
                       cache: &mut AddressCache) -> Result<SampleSet> {
    if let Some(p) = cache.get(address) {
        debug!("Address '{}' is cached at {}", address, p);
        return Ok(SampleSet::single(p));
    }

    let p = geocoder.geocode(address)?
        .ok_or_else(|| Error::Geocode(address.to_string()))?;
    debug!("Address '{}' is at {}", address, p);
    cache.insert(address, &p)?;

    Ok(SampleSet::single(p))
}

pub fn resolve_point(p: GeoPoint) -> SampleSet {
    SampleSet::single(p)
}

pub fn resolve_points(points: Vec<GeoPoint>) -> SampleSet {
    SampleSet::from(points)
}

pub fn resolve_segment(a: GeoPoint, b: GeoPoint, n: usize)
                       -> Result<SampleSet> {
    Segment::new(a, b).sample(n)
}

pub fn resolve_track(fname: &Path, name: &str) -> Result<SampleSet> {
    let features = track::read_features(fname)?;
    let line = track::find_line(&features, name, fname)?;
    info!("Line '{}' in {}: {}", name, fname.display(), line);

    Ok(line)
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

pub fn parse_route(route: &str) -> Result<(String, String)> {
    let start = regex_captures!(r"(?:^|;)\s*start\s*=([^;]*)", route)
        .map(|(_, s)| unquote(s));
    let end = regex_captures!(r"(?:^|;)\s*end\s*=([^;]*)", route)
        .map(|(_, s)| unquote(s));

    match (start, end) {
        (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => {
            Ok((s.to_string(), e.to_string()))
        },
        _ => Err(Error::MalformedRoute(route.to_string())),
    }
}

// Start of every step in every leg, followed by the end of the last step
// of each leg. Order is kept as returned, nothing is merged.
pub fn flatten_legs(legs: &[Leg]) -> SampleSet {
    let mut turns = SampleSet::new();

    for leg in legs {
        for step in &leg.steps {
            turns.push(step.start);
        }
        if let Some(last) = leg.steps.last() {
            turns.push(last.end);
        }
    }

    turns
}

pub fn resolve_directions(route: &str, service: &dyn DirectionsService)
                          -> Result<SampleSet> {
    let (start, end) = parse_route(route)?;
    let legs = service.directions(&start, &end, TravelMode::Walking,
                                  Utc::now())?;
    let turns = flatten_legs(&legs);

    if turns.is_empty() {
        return Err(Error::Directions { start: start, end: end });
    }

    info!("Walking route '{}' -> '{}': {} turns", start, end, turns.len());

    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Step;

    use chrono::DateTime;
    use std::cell::{Cell, RefCell};

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    struct CountingGeocoder {
        calls: Cell<usize>,
        answer: Option<GeoPoint>,
    }

    impl Geocoder for CountingGeocoder {
        fn geocode(&self, _: &str) -> Result<Option<GeoPoint>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.answer)
        }
    }

    struct FixedDirections {
        legs: Vec<Leg>,
        asked: RefCell<Vec<(String, String)>>,
    }

    impl DirectionsService for FixedDirections {
        fn directions(&self, start: &str, end: &str, mode: TravelMode,
                      _: DateTime<Utc>) -> Result<Vec<Leg>> {
            assert_eq!(mode, TravelMode::Walking);
            self.asked.borrow_mut().push((start.to_string(), end.to_string()));
            Ok(self.legs.clone())
        }
    }

    #[test]
    fn route_string_in_either_order() {
        assert_eq!(parse_route("start='417 S Craig St';end='4125 Schenley Dr.'")
                   .unwrap(),
                   ("417 S Craig St".to_string(),
                    "4125 Schenley Dr.".to_string()));
        assert_eq!(parse_route("end=B street; start=A street").unwrap(),
                   ("A street".to_string(), "B street".to_string()));
    }

    #[test]
    fn route_string_without_end_is_rejected() {
        for bad in ["start=A", "end=B", "", "start=;end=B", "from=A;to=B"] {
            assert!(matches!(parse_route(bad), Err(Error::MalformedRoute(_))),
                    "{}", bad);
        }
    }

    #[test]
    fn malformed_route_makes_no_call() {
        let service = FixedDirections { legs: vec![], asked: RefCell::new(vec![]) };
        assert!(resolve_directions("start=A", &service).is_err());
        assert!(service.asked.borrow().is_empty());
    }

    #[test]
    fn turns_keep_order_without_duplicates() {
        let (a, b, c) = (pt(1.0, 1.0), pt(2.0, 2.0), pt(3.0, 3.0));
        let service = FixedDirections {
            legs: vec![Leg {
                steps: vec![Step { start: a, end: b }, Step { start: b, end: c }],
            }],
            asked: RefCell::new(vec![]),
        };

        let turns = resolve_directions("start=A;end=C", &service).unwrap();
        assert_eq!(turns.points(), &[a, b, c]);
        assert_eq!(service.asked.borrow()[0],
                   ("A".to_string(), "C".to_string()));
    }

    #[test]
    fn every_leg_ends_with_its_last_step() {
        let (a, b, c, d) = (pt(1.0, 1.0), pt(2.0, 2.0), pt(3.0, 3.0),
                            pt(4.0, 4.0));
        let legs = vec![
            Leg { steps: vec![Step { start: a, end: b }] },
            Leg { steps: vec![] },
            Leg { steps: vec![Step { start: c, end: d }] },
        ];
        assert_eq!(flatten_legs(&legs).points(), &[a, b, c, d]);
    }

    #[test]
    fn no_route_is_an_error() {
        let service = FixedDirections { legs: vec![], asked: RefCell::new(vec![]) };
        assert!(matches!(resolve_directions("start=A;end=B", &service),
                         Err(Error::Directions { .. })));
    }

    #[test]
    fn address_is_geocoded_once_then_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AddressCache::load(&dir.path().join("a.json")).unwrap();
        let p = pt(40.444837, -79.9471412);
        let geocoder = CountingGeocoder { calls: Cell::new(0), answer: Some(p) };

        let first = resolve_address("4720 Forbes Ave", &geocoder, &mut cache)
            .unwrap();
        let second = resolve_address("4720 Forbes Ave", &geocoder, &mut cache)
            .unwrap();

        assert_eq!(first.points(), &[p]);
        assert_eq!(second, first);
        assert_eq!(geocoder.calls.get(), 1);
    }

    #[test]
    fn unknown_address_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AddressCache::load(&dir.path().join("a.json")).unwrap();
        let geocoder = CountingGeocoder { calls: Cell::new(0), answer: None };

        assert!(matches!(resolve_address("nowhere", &geocoder, &mut cache),
                         Err(Error::Geocode(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn point_and_list_are_identity() {
        let a = pt(1.0, 2.0);
        let b = pt(3.0, 4.0);
        assert_eq!(resolve_point(a).points(), &[a]);
        assert_eq!(resolve_points(vec![a, b, a]).points(), &[a, b, a]);
    }
}
