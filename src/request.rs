use crate::error::Result;
use crate::point::GeoPoint;
use crate::services::{LinkMetadata, PhotoLink, PhotoService, StreetViewParams};
use crate::settings::Settings;

use log::debug;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct PhotoRequestResult {
    pub point: GeoPoint,
    // Route name extended with the point coordinates
    pub route_name: String,
    pub location: String,
    pub display_location: String,
    pub headings: Vec<String>,
    pub links: Vec<PhotoLink>,
    pub metadata: Vec<LinkMetadata>,
}

pub fn point_label(route_label: &str, point: &GeoPoint) -> String {
    format!("{}latx{:.5}lngx{:.5}", route_label, point.lat, point.lng)
}

fn random_heading() -> String {
    let h: f64 = rand::rng().random_range(0.0..360.0);
    format!("{}", (h.round() as u32) % 360)
}

pub fn street_view_params(point: &GeoPoint, settings: &Settings,
                          random_heading_on: bool) -> StreetViewParams {
    let headings = if random_heading_on {
        vec![random_heading()]
    }
    else {
        settings.heading_list()
    };

    StreetViewParams {
        size: settings.imgsize.clone(),
        location: point.location_string(),
        headings: headings,
        pitch: settings.pitch.to_string(),
    }
}

pub fn build_request(point: &GeoPoint, route_label: &str,
                     random_heading_on: bool, settings: &Settings,
                     service: &dyn PhotoService)
                     -> Result<PhotoRequestResult> {
    let params = street_view_params(point, settings, random_heading_on);
    debug!("Requesting {} headings at {}", params.headings.len(),
           params.location);

    let found = service.resolve_links(&params)?;

    Ok(PhotoRequestResult {
        point: *point,
        route_name: point_label(route_label, point),
        location: params.location,
        display_location: point.display_string(),
        headings: params.headings,
        links: found.links,
        metadata: found.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PhotoLinks;

    use std::cell::RefCell;
    use std::path::Path;

    struct Recorder {
        seen: RefCell<Vec<StreetViewParams>>,
    }

    impl PhotoService for Recorder {
        fn resolve_links(&self, params: &StreetViewParams)
                         -> Result<PhotoLinks> {
            self.seen.borrow_mut().push(params.clone());
            Ok(PhotoLinks {
                links: params.headings.iter().map(|h| PhotoLink {
                    heading: h.clone(),
                    url: format!("http://photos/{}", h),
                }).collect(),
                metadata: vec![],
            })
        }

        fn download(&self, _: &mut PhotoRequestResult, _: &Path)
                    -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn label_uses_five_decimals() {
        let p = GeoPoint::new(40.45066718053887, -79.93559640239131).unwrap();
        assert_eq!(point_label("CMUSPT", &p), "CMUSPTlatx40.45067lngx-79.93560");
    }

    #[test]
    fn labels_differ_for_distinct_points() {
        let a = GeoPoint::new(40.45066, -79.93559).unwrap();
        let b = GeoPoint::new(40.45067, -79.93559).unwrap();
        let c = GeoPoint::new(40.45066, -79.93558).unwrap();

        assert_ne!(point_label("R", &a), point_label("R", &b));
        assert_ne!(point_label("R", &a), point_label("R", &c));
        assert_eq!(point_label("R", &a), point_label("R", &a));
    }

    #[test]
    fn one_link_per_configured_heading() {
        let settings = Settings::default();
        let service = Recorder { seen: RefCell::new(vec![]) };
        let p = GeoPoint::new(40.44416469999999, -79.9433725).unwrap();

        let result = build_request(&p, "Walk", false, &settings, &service)
            .unwrap();

        let seen = service.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].location, "40.44416469999999,-79.9433725");
        assert_eq!(seen[0].size, "640x640");
        assert_eq!(seen[0].pitch, "0");
        assert_eq!(result.headings, vec!["0", "90", "180", "270"]);
        assert_eq!(result.links.len(), 4);
        assert_eq!(result.links[2].heading, "180");
    }

    #[test]
    fn random_heading_is_single_and_in_range() {
        let settings = Settings::default();
        let p = GeoPoint::new(1.0, 2.0).unwrap();

        for _ in 0..50 {
            let params = street_view_params(&p, &settings, true);
            assert_eq!(params.headings.len(), 1);
            let h: u32 = params.headings[0].parse().unwrap();
            assert!(h < 360);
        }
    }
}
