use crate::cache::AddressCache;
use crate::display::ImageViewer;
use crate::error::Result;
use crate::materialize::{ArtifactRecord, Materializer};
use crate::point::GeoPoint;
use crate::request::build_request;
use crate::resolve;
use crate::samples::SampleSet;
use crate::services::{DirectionsService, Geocoder, GeoTagger, MapTileService,
                      PhotoService};
use crate::settings::Settings;

use log::{error, info};
use std::path::Path;

pub struct Services<'a> {
    pub geocoder: &'a dyn Geocoder,
    pub directions: &'a dyn DirectionsService,
    pub photos: &'a dyn PhotoService,
    pub maps: &'a dyn MapTileService,
    pub tagger: &'a dyn GeoTagger,
    pub viewer: &'a dyn ImageViewer,
}

pub struct Pipeline<'a> {
    settings: &'a Settings,
    geocoder: &'a dyn Geocoder,
    directions: &'a dyn DirectionsService,
    photos: &'a dyn PhotoService,
    materializer: Materializer<'a>,
    cache: AddressCache,
    random_heading: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings, services: Services<'a>) -> Result<Self> {
        let cache = AddressCache::load(Path::new(&settings.address_file))?;

        Ok(Self {
            settings: settings,
            geocoder: services.geocoder,
            directions: services.directions,
            photos: services.photos,
            materializer: Materializer::new(settings, services.photos,
                                            services.tagger, services.maps,
                                            services.viewer),
            cache: cache,
            random_heading: false,
        })
    }

    pub fn with_random_heading(mut self, on: bool) -> Self {
        self.random_heading = on;
        self
    }

    pub fn address_cache(&self) -> &AddressCache {
        &self.cache
    }

    fn process_point(&self, p: &GeoPoint, route_label: &str)
                     -> Result<Vec<ArtifactRecord>> {
        let mut result = build_request(p, route_label, self.random_heading,
                                       self.settings, self.photos)?;
        self.materializer.materialize(&mut result)
    }

    pub fn run_address(&mut self, address: &str) -> Result<Vec<ArtifactRecord>> {
        let samples = resolve::resolve_address(address, self.geocoder,
                                               &mut self.cache)?;
        let mut artifacts = vec![];

        for p in &samples {
            artifacts.append(&mut self.process_point(p, address)?);
        }

        Ok(artifacts)
    }

    pub fn run_point(&self, p: &GeoPoint, name: &str)
                     -> Result<Vec<ArtifactRecord>> {
        let label = format!("{}-latx{:.6}lngx{:.6}", name, p.lat, p.lng);
        let mut artifacts = vec![];

        for q in &resolve::resolve_point(*p) {
            artifacts.append(&mut self.process_point(q, &label)?);
        }

        Ok(artifacts)
    }

    // Runs every point of the set. A failing point is logged and skipped.
    pub fn run_points(&self, samples: &SampleSet, name: &str)
                      -> Vec<ArtifactRecord> {
        let mut artifacts = vec![];

        info!("Route {}: {}", name, samples);

        for (i, p) in samples.into_iter().enumerate() {
            match self.run_point(p, name) {
                Ok(mut a) => artifacts.append(&mut a),
                Err(e) => {
                    error!("Point {} of {} {} failed: {}", i + 1, name, p, e);
                },
            }
        }

        artifacts
    }

    pub fn run_point_list(&self, points: Vec<GeoPoint>, name: &str)
                          -> Vec<ArtifactRecord> {
        self.run_points(&resolve::resolve_points(points), name)
    }

    pub fn run_segment(&self, a: GeoPoint, b: GeoPoint, name: &str, n: usize)
                       -> Result<Vec<ArtifactRecord>> {
        let samples = resolve::resolve_segment(a, b, n)?;
        Ok(self.run_points(&samples, name))
    }

    pub fn run_track(&self, fname: &Path, name: &str)
                     -> Result<Vec<ArtifactRecord>> {
        let samples = resolve::resolve_track(fname, name)?;
        Ok(self.run_points(&samples, name))
    }

    pub fn run_directions(&self, route: &str, name: &str)
                          -> Result<Vec<ArtifactRecord>> {
        let samples = resolve::resolve_directions(route, self.directions)?;
        Ok(self.run_points(&samples, name))
    }
}
