use crate::error::Result;
use crate::point::GeoPoint;
use crate::request::PhotoRequestResult;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeoPoint>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leg {
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TravelMode {
    Walking,
    Driving,
    Bicycling,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

pub trait DirectionsService {
    // Legs of the first suggested route, in travel order. An empty list
    // means no route was found.
    fn directions(&self, start: &str, end: &str, mode: TravelMode,
                  departure: DateTime<Utc>) -> Result<Vec<Leg>>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct StreetViewParams {
    pub size: String,
    pub location: String,
    pub headings: Vec<String>,
    pub pitch: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhotoLink {
    pub heading: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub heading: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pano_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    // File name assigned by download(). None until downloaded, and stays
    // None when the service has no photo for the link.
    #[serde(default, rename = "_file", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl LinkMetadata {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhotoLinks {
    pub links: Vec<PhotoLink>,
    pub metadata: Vec<LinkMetadata>,
}

pub trait PhotoService {
    fn resolve_links(&self, params: &StreetViewParams) -> Result<PhotoLinks>;

    // Fetches every available link of the result into dir and records the
    // assigned file names in its metadata.
    fn download(&self, result: &mut PhotoRequestResult, dir: &Path)
                -> Result<()>;
}

pub trait MapTileService {
    fn fetch_map_tile(&self, center: &GeoPoint, zoom: u8, size: &str,
                      markers: &[GeoPoint]) -> Result<Vec<u8>>;
}

pub trait GeoTagger {
    fn write_gps_tags(&self, fname: &Path, point: &GeoPoint) -> Result<()>;
}
