use crate::display::ImageViewer;
use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::request::PhotoRequestResult;
use crate::services::{GeoTagger, MapTileService, PhotoService};
use crate::settings::Settings;

use chrono::Local;
use image::RgbaImage;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// File name prefix the photo service gives downloads
const PROVIDER_PREFIX: &str = "gsv_";
const MAP_TILE_FNAME: &str = "tmpmap.png";
const MAP_TILE_SIZE: &str = "640x640";

#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub point: GeoPoint,
    pub heading: String,
}

pub fn safe_prefix(route_name: &str) -> String {
    route_name.chars().filter(|c| c.is_alphanumeric()).collect()
}

pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}

// `GSV-<prefix>_h<heading>_p<pitch>_<timestamp>_<provider id>` where the
// provider id is the downloaded file name without the service prefix.
pub fn artifact_name(prefix: &str, heading: &str, pitch: f64,
                     timestamp: &str, provider_fname: &str) -> String {
    let provider_id = provider_fname.strip_prefix(PROVIDER_PREFIX)
        .unwrap_or(provider_fname);

    format!("GSV-{}_h{}_p{}_{}_{}", prefix, heading, pitch, timestamp,
            provider_id)
}

pub struct Materializer<'a> {
    settings: &'a Settings,
    photos: &'a dyn PhotoService,
    tagger: &'a dyn GeoTagger,
    maps: &'a dyn MapTileService,
    viewer: &'a dyn ImageViewer,
}

impl<'a> Materializer<'a> {
    pub fn new(settings: &'a Settings, photos: &'a dyn PhotoService,
               tagger: &'a dyn GeoTagger, maps: &'a dyn MapTileService,
               viewer: &'a dyn ImageViewer) -> Self {
        Self {
            settings: settings,
            photos: photos,
            tagger: tagger,
            maps: maps,
            viewer: viewer,
        }
    }

    pub fn materialize(&self, result: &mut PhotoRequestResult)
                       -> Result<Vec<ArtifactRecord>> {
        let dir = self.settings.image_dir();
        fs::create_dir_all(&dir)?;

        self.photos.download(result, &dir)?;

        let artifacts = self.rename_and_tag(result, &dir);
        let mut produced: Vec<PathBuf> = artifacts.iter()
            .map(|a| a.path.clone())
            .collect();

        if self.settings.plot_on {
            if let Some(tile) = self.show(result, &artifacts, &dir) {
                produced.push(tile);
            }
        }

        if self.settings.clean {
            debug!("Deleting downloaded files: {:?}", produced);
            for fname in &produced {
                if fname.is_file() {
                    if let Err(e) = fs::remove_file(fname) {
                        warn!("Cannot delete {}: {}", fname.display(), e);
                    }
                }
            }
        }

        Ok(artifacts)
    }

    // Per file failures are logged and the file skipped
    fn rename_and_tag(&self, result: &PhotoRequestResult, dir: &Path)
                      -> Vec<ArtifactRecord> {
        let prefix = safe_prefix(&result.route_name);
        let stamp = timestamp();
        let mut artifacts = vec![];

        for meta in &result.metadata {
            let fname = match &meta.file {
                Some(f) => f,
                None => {
                    error!("No photo for heading {} at {} (status '{}'), \
                            skipping", meta.heading, result.location,
                           meta.status);
                    continue;
                },
            };

            if !result.headings.contains(&meta.heading) {
                warn!("{} has heading {} which was not requested",
                      fname, meta.heading);
            }

            let source = dir.join(fname);
            let target = dir.join(artifact_name(&prefix, &meta.heading,
                                                self.settings.pitch, &stamp,
                                                fname));

            if !source.is_file() {
                error!("{}", Error::ArtifactMissing(source));
                continue;
            }

            debug!("{} to {}", source.display(), target.display());
            if let Err(e) = fs::rename(&source, &target) {
                error!("Cannot rename {}: {}", source.display(), e);
                continue;
            }

            if let Err(e) = self.tagger.write_gps_tags(&target, &result.point) {
                error!("{}", e);
            }

            artifacts.push(ArtifactRecord {
                path: target,
                point: result.point,
                heading: meta.heading.clone(),
            });
        }

        info!("{}: {} of {} photos stored", result.route_name,
              artifacts.len(), result.links.len());

        artifacts
    }

    fn fetch_map_tile(&self, point: &GeoPoint, dir: &Path)
                      -> Result<(PathBuf, RgbaImage)> {
        let bytes = self.maps.fetch_map_tile(point, self.settings.map_zoom,
                                             MAP_TILE_SIZE, &[])?;
        let fname = dir.join(MAP_TILE_FNAME);
        fs::write(&fname, &bytes)?;
        let im = image::load_from_memory(&bytes)?.to_rgba8();

        Ok((fname, im))
    }

    // Shows the grid. Returns the map tile file, if one was written.
    fn show(&self, result: &PhotoRequestResult,
            artifacts: &[ArtifactRecord], dir: &Path) -> Option<PathBuf> {
        let mut images = vec![];
        let mut tile_fname = None;

        for a in artifacts {
            match image::open(&a.path) {
                Ok(im) => images.push(im.to_rgba8()),
                Err(e) => error!("Cannot load {}: {}", a.path.display(), e),
            }
        }

        if self.settings.map_on {
            match self.fetch_map_tile(&result.point, dir) {
                Ok((fname, im)) => {
                    tile_fname = Some(fname);
                    images.push(im);
                },
                Err(e) => error!("No map for {}: {}", result.location, e),
            }
        }

        let title = format!("{} at {}", result.route_name,
                            result.display_location);
        if let Err(e) = self.viewer.show(&title, images, self.settings) {
            error!("{}", e);
        }

        tile_fname
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_keeps_letters_and_digits() {
        assert_eq!(safe_prefix("CMUSPTlatx40.45067lngx-79.93560"),
                   "CMUSPTlatx4045067lngx7993560");
        assert_eq!(safe_prefix("5000 Forbes Ave, Pittsburgh"),
                   "5000ForbesAvePittsburgh");
    }

    #[test]
    fn artifact_name_layout() {
        assert_eq!(artifact_name("Walk", "90", 0.0, "2024-05-01-10-00-00",
                                 "gsv_1.jpg"),
                   "GSV-Walk_h90_p0_2024-05-01-10-00-00_1.jpg");
        assert_eq!(artifact_name("Walk", "270", 12.5, "t", "photo.jpg"),
                   "GSV-Walk_h270_p12.5_t_photo.jpg");
    }

    #[test]
    fn timestamp_has_no_separators_to_strip() {
        let t = timestamp();
        assert_eq!(t.len(), 19);
        assert!(t.chars().all(|c| c.is_ascii_digit() || c == '-'));
    }
}
