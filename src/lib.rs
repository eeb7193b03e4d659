pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod geotag;
pub mod google;
pub mod logging;
pub mod materialize;
pub mod pipeline;
pub mod point;
pub mod request;
pub mod resolve;
pub mod samples;
pub mod services;
pub mod settings;
pub mod track;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::materialize::ArtifactRecord;
pub use crate::pipeline::{Pipeline, Services};
pub use crate::point::GeoPoint;
pub use crate::samples::SampleSet;
pub use crate::settings::Settings;
