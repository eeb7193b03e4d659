use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::samples::SampleSet;

use gpx::Gpx;
use log::{debug, error};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use xml::reader::{EventReader, XmlEvent};

#[derive(Clone, Debug, PartialEq)]
pub struct TrackFeature {
    pub name: String,
    pub points: Vec<GeoPoint>,
}

fn track_error(fname: &Path, reason: impl ToString) -> Error {
    Error::Track {
        path: fname.to_path_buf(),
        reason: reason.to_string(),
    }
}

pub fn read_features(fname: &Path) -> Result<Vec<TrackFeature>> {
    let reader = BufReader::new(File::open(fname)?);
    let ext = fname.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "kml" => parse_kml(reader, fname),
        "gpx" => parse_gpx(reader, fname),
        _ => Err(track_error(fname, "expected a .kml or .gpx file")),
    }
}

// KML coordinates: whitespace separated "lng,lat[,alt]" tuples. Altitude
// is rounded to whole meters.
pub fn parse_coordinates(text: &str) -> Result<Vec<GeoPoint>> {
    let mut points = vec![];

    for tuple in text.split_whitespace() {
        let values = tuple.split(',')
            .map(|v| v.parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|_| Error::InvalidCoordinate(
                format!("bad coordinate tuple '{}'", tuple)))?;
        let p = GeoPoint::from_lng_lat(&values)?;
        points.push(p.with_alt(p.alt.map(|a| a.round())));
    }

    Ok(points)
}

pub fn parse_kml<R: Read>(reader: R, fname: &Path)
                          -> Result<Vec<TrackFeature>> {
    let mut features = vec![];
    let mut stack: Vec<String> = vec![];
    let mut name = String::new();
    let mut coords: Option<String> = None;

    for event in EventReader::new(reader) {
        match event.map_err(|e| track_error(fname, e))? {
            XmlEvent::StartElement { name: tag, .. } => {
                if tag.local_name == "Placemark" {
                    name.clear();
                    coords = None;
                }
                stack.push(tag.local_name);
            },
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                let len = stack.len();
                if len < 2 {
                    continue;
                }
                let (parent, current) = (&stack[len - 2], &stack[len - 1]);

                if parent == "Placemark" && current == "name" {
                    name.push_str(text.trim());
                }
                else if parent == "LineString" && current == "coordinates" {
                    coords.get_or_insert_with(String::new).push_str(&text);
                }
            },
            XmlEvent::EndElement { name: tag } => {
                if tag.local_name == "Placemark" {
                    if let Some(c) = coords.take() {
                        features.push(TrackFeature {
                            name: name.clone(),
                            points: parse_coordinates(&c)?,
                        });
                    }
                }
                stack.pop();
            },
            _ => { },
        }
    }

    debug!("{}: {} line features", fname.display(), features.len());

    Ok(features)
}

fn gpx_point(wp: &gpx::Waypoint) -> Result<GeoPoint> {
    Ok(GeoPoint::try_from(wp.point())?.with_alt(wp.elevation))
}

pub fn parse_gpx<R: Read>(reader: R, fname: &Path)
                          -> Result<Vec<TrackFeature>> {
    let gpx: Gpx = gpx::read(reader).map_err(|e| track_error(fname, e))?;
    let mut features = vec![];

    for track in &gpx.tracks {
        let mut points = vec![];
        for segment in &track.segments {
            for wp in &segment.points {
                points.push(gpx_point(wp)?);
            }
        }

        features.push(TrackFeature {
            name: track.name.clone().unwrap_or_default(),
            points: points,
        });
    }

    for route in &gpx.routes {
        features.push(TrackFeature {
            name: route.name.clone().unwrap_or_default(),
            points: route.points.iter()
                .map(gpx_point)
                .collect::<Result<Vec<GeoPoint>>>()?,
        });
    }

    debug!("{}: {} line features", fname.display(), features.len());

    Ok(features)
}

// Picks the line named `name`. Several features with that name are only
// accepted when they have identical vertices.
pub fn find_line(features: &[TrackFeature], name: &str, fname: &Path)
                 -> Result<SampleSet> {
    let not_found = || Error::FeatureNotFound {
        name: name.to_string(),
        path: fname.to_path_buf(),
    };

    let mut matches = features.iter().filter(|f| f.name == name);
    let first = matches.next().ok_or_else(not_found)?;

    for other in matches {
        if other.points != first.points {
            error!("{} has several different lines named '{}'",
                   fname.display(), name);
            return Err(not_found());
        }
    }

    if first.points.is_empty() {
        return Err(track_error(fname, format!("line '{}' has no points",
                                              name)));
    }

    Ok(SampleSet::from(first.points.clone()))
}
