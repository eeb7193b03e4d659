use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::request::PhotoRequestResult;
use crate::services::{DirectionsService, Geocoder, Leg, LinkMetadata,
                      MapTileService, PhotoLink, PhotoLinks, PhotoService,
                      Step, StreetViewParams, TravelMode};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

const API_BASE: &str = "https://maps.googleapis.com/maps/api";
const METADATA_FNAME: &str = "metadata.json";

#[derive(Deserialize, Clone, Copy)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<LatLng> for GeoPoint {
    type Error = Error;

    fn try_from(ll: LatLng) -> Result<Self> {
        GeoPoint::new(ll.lat, ll.lng)
    }
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct DirectionsStep {
    start_location: LatLng,
    end_location: LatLng,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct StreetViewMetadata {
    status: String,
    pano_id: Option<String>,
    date: Option<String>,
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::BadUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub struct GoogleMaps {
    client: Client,
    key: String,
}

impl GoogleMaps {
    pub fn new(key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("gatebilde/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client: client,
            key: key.to_string(),
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = parse_url(&format!("{}/{}", API_BASE, endpoint))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.key);

        Ok(url)
    }

    fn get(&self, service: &'static str, url: Url) -> Result<Response> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(Error::Service {
                service: service,
                status: format!("HTTP {}", response.status()),
            });
        }

        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, service: &'static str, url: Url)
                                     -> Result<T> {
        Ok(self.get(service, url)?.json()?)
    }

    fn street_view_params(params: &StreetViewParams, heading: &str)
                          -> Vec<(&'static str, String)> {
        vec![
            ("size", params.size.clone()),
            ("location", params.location.clone()),
            ("heading", heading.to_string()),
            ("pitch", params.pitch.clone()),
        ]
    }
}

impl Geocoder for GoogleMaps {
    fn geocode(&self, address: &str) -> Result<Option<GeoPoint>> {
        let url = self.url("geocode/json", &[("address", address.to_string())])?;
        let response: GeocodeResponse = self.get_json("geocode", url)?;

        match response.status.as_str() {
            "OK" => {
                match response.results.first() {
                    Some(r) => Ok(Some(GeoPoint::try_from(r.geometry.location)?)),
                    None => Ok(None),
                }
            },
            "ZERO_RESULTS" => Ok(None),
            s => Err(Error::Service {
                service: "geocode",
                status: s.to_string(),
            }),
        }
    }
}

impl DirectionsService for GoogleMaps {
    fn directions(&self, start: &str, end: &str, mode: TravelMode,
                  departure: DateTime<Utc>) -> Result<Vec<Leg>> {
        let url = self.url("directions/json", &[
            ("origin", start.to_string()),
            ("destination", end.to_string()),
            ("mode", mode.as_str().to_string()),
            ("departure_time", departure.timestamp().to_string()),
        ])?;
        let response: DirectionsResponse = self.get_json("directions", url)?;

        legs_from_response(response)
    }
}

fn legs_from_response(response: DirectionsResponse) -> Result<Vec<Leg>> {
    match response.status.as_str() {
        "OK" => { },
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(vec![]),
        s => return Err(Error::Service {
            service: "directions",
            status: s.to_string(),
        }),
    }

    // Only the first suggested route is used
    let route = match response.routes.into_iter().next() {
        Some(r) => r,
        None => return Ok(vec![]),
    };

    route.legs.into_iter()
        .map(|leg| {
            let steps = leg.steps.into_iter()
                .map(|s| Ok(Step {
                    start: GeoPoint::try_from(s.start_location)?,
                    end: GeoPoint::try_from(s.end_location)?,
                }))
                .collect::<Result<Vec<Step>>>()?;
            Ok(Leg { steps: steps })
        })
        .collect()
}

impl PhotoService for GoogleMaps {
    fn resolve_links(&self, params: &StreetViewParams) -> Result<PhotoLinks> {
        let mut found = PhotoLinks::default();

        for heading in &params.headings {
            let query = GoogleMaps::street_view_params(params, heading);
            let link = self.url("streetview", &query)?;
            let meta: StreetViewMetadata = self.get_json(
                "streetview metadata", self.url("streetview/metadata", &query)?)?;

            debug!("Heading {} at {}: {}", heading, params.location,
                   meta.status);

            found.links.push(PhotoLink {
                heading: heading.clone(),
                url: link.to_string(),
            });
            found.metadata.push(LinkMetadata {
                heading: heading.clone(),
                status: meta.status,
                pano_id: meta.pano_id,
                date: meta.date,
                file: None,
            });
        }

        Ok(found)
    }

    fn download(&self, result: &mut PhotoRequestResult, dir: &Path)
                -> Result<()> {
        for (i, meta) in result.metadata.iter_mut().enumerate() {
            if !meta.is_ok() {
                continue;
            }

            let link = match result.links.iter()
                .find(|l| l.heading == meta.heading) {
                Some(l) => l,
                None => {
                    warn!("No link for heading {}", meta.heading);
                    continue;
                },
            };

            let url = parse_url(&link.url)?;
            let bytes = self.get("streetview", url)?.bytes()?;
            let fname = format!("gsv_{}.jpg", i);
            std::fs::write(dir.join(&fname), &bytes)?;
            meta.file = Some(fname);
        }

        let mut writer = BufWriter::new(File::create(dir.join(METADATA_FNAME))?);
        serde_json::to_writer_pretty(&mut writer, &result.metadata)?;
        writer.flush()?;

        Ok(())
    }
}

impl MapTileService for GoogleMaps {
    fn fetch_map_tile(&self, center: &GeoPoint, zoom: u8, size: &str,
                      markers: &[GeoPoint]) -> Result<Vec<u8>> {
        let mut params = vec![
            ("center", center.location_string()),
            ("zoom", zoom.to_string()),
            ("size", size.to_string()),
            ("maptype", "roadmap".to_string()),
            ("markers", format!("color:red|label:C|{}",
                                center.location_string())),
        ];
        for m in markers {
            params.push(("markers", format!("color:blue|label:W|{}",
                                            m.location_string())));
        }

        let url = self.url("staticmap", &params)?;
        let bytes = self.get("staticmap", url)?.bytes()?;

        Ok(bytes.to_vec())
    }
}
