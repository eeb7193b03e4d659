use crate::error::{Error, Result};
use crate::point::GeoPoint;

use core::slice::Iter;
use std::fmt;

// Straight line between two points in (lat, lng) space, with lat taken
// as x and lng as y.
#[derive(Clone, Debug)]
pub struct Segment {
    pub a: GeoPoint,
    pub b: GeoPoint,
}

impl Segment {
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            a: a,
            b: b,
        }
    }

    // Slope and y-intercept of the line through a and b. Undefined when
    // both points share the same latitude.
    fn line(&self) -> Result<(f64, f64)> {
        let (x1, y1, x2, y2) = (self.a.lat, self.a.lng, self.b.lat, self.b.lng);

        if x1 == x2 {
            return Err(Error::DegenerateLine(self.a.to_string(),
                                             self.b.to_string()));
        }

        let m = (y1 - y2)/(x1 - x2);
        let b = (x1*y2 - x2*y1)/(x1 - x2);

        Ok((m, b))
    }

    pub fn sample(&self, n: usize) -> Result<SampleSet> {
        let (m, b) = self.line()?;
        let step = (self.b.lat - self.a.lat)/((n + 1) as f64);
        let mut samples = SampleSet::new();

        samples.push(self.a);

        for i in 1..=n {
            let x = self.a.lat + (i as f64)*step;
            samples.push(GeoPoint {
                lat: x,
                lng: m*x + b,
                alt: None,
            });
        }

        samples.push(self.b);

        Ok(samples)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("{} -> {}", self.a, self.b))
    }
}

pub fn sample(pt1: GeoPoint, pt2: GeoPoint, n: usize) -> Result<SampleSet> {
    Segment::new(pt1, pt2).sample(n)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSet {
    points: Vec<GeoPoint>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self {
            points: vec!(),
        }
    }

    pub fn single(p: GeoPoint) -> Self {
        Self {
            points: vec![p],
        }
    }

    pub fn push(&mut self, p: GeoPoint) {
        self.points.push(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }
}

impl From<Vec<GeoPoint>> for SampleSet {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self {
            points: points,
        }
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a GeoPoint;

    type IntoIter = Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl fmt::Display for SampleSet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => {
                formatter.write_fmt(format_args!("{} -> {} ({} pts)",
                                                 first, last,
                                                 self.points.len()))
            },
            _ => formatter.write_str("(no points)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn endpoints_are_kept_verbatim() {
        let a = pt(40.45066718053887, -79.93559640239131).with_alt(Some(282.0));
        let b = pt(40.45213252042862, -79.93091008312071);

        for n in 0..6 {
            let s = sample(a, b, n).unwrap();
            assert_eq!(s.len(), n + 2);
            assert_eq!(s.first(), Some(&a));
            assert_eq!(s.last(), Some(&b));
        }
    }

    #[test]
    fn interior_points_are_monotonic_and_on_the_line() {
        let a = pt(40.444837, -79.9471412);
        let b = pt(40.4441647, -79.9433725);
        let s = sample(a, b, 5).unwrap();
        let pts = s.points();

        for w in pts.windows(2) {
            assert!(w[1].lat < w[0].lat);
        }

        let slope = (b.lng - a.lng)/(b.lat - a.lat);
        for p in &pts[1..pts.len() - 1] {
            let expected = a.lng + slope*(p.lat - a.lat);
            assert!((p.lng - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn even_spacing() {
        let s = sample(pt(10.0, 20.0), pt(14.0, 28.0), 3).unwrap();
        let lats: Vec<f64> = s.points().iter().map(|p| p.lat).collect();
        let lngs: Vec<f64> = s.points().iter().map(|p| p.lng).collect();

        assert_eq!(lats, vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        for (got, want) in lngs.iter().zip([20.0, 22.0, 24.0, 26.0, 28.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn sampling_is_deterministic() {
        let a = pt(1.0, 2.0);
        let b = pt(3.5, -7.25);
        assert_eq!(sample(a, b, 7).unwrap(), sample(a, b, 7).unwrap());
    }

    #[test]
    fn equal_latitudes_are_rejected() {
        let a = pt(40.45, -79.93);
        assert!(matches!(sample(a, a, 3), Err(Error::DegenerateLine(..))));
        assert!(matches!(sample(a, pt(40.45, -79.0), 0),
                         Err(Error::DegenerateLine(..))));
    }
}
