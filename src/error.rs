use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("cannot sample a line between {0} and {1}: latitudes coincide")]
    DegenerateLine(String, String),
    #[error("geocoding '{0}' returned no result")]
    Geocode(String),
    #[error("no walking directions from '{start}' to '{end}'")]
    Directions { start: String, end: String },
    #[error("bad route string, missing start or end: {0}")]
    MalformedRoute(String),
    #[error("no line feature named '{name}' in {path}")]
    FeatureNotFound { name: String, path: PathBuf },
    #[error("downloaded file {0} does not exist")]
    ArtifactMissing(PathBuf),
    #[error("malformed track file {path}: {reason}")]
    Track { path: PathBuf, reason: String },
    #[error("{service} request failed with status {status}")]
    Service { service: &'static str, status: String },
    #[error("malformed service url '{url}': {reason}")]
    BadUrl { url: String, reason: String },
    #[error("failed to geotag {path}: {reason}")]
    Geotag { path: PathBuf, reason: String },
    #[error("display failed: {0}")]
    Display(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
