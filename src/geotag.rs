use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::services::GeoTagger;

use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use log::debug;
use std::path::Path;

// Seconds are stored with four decimals
const SECONDS_DENOMINATOR: u32 = 10000;
const ALTITUDE_DENOMINATOR: u32 = 100;

pub fn to_dms(deg: f64) -> [(u32, u32); 3] {
    let abs = deg.abs();
    let mut d = abs.floor() as u32;
    let mut m = ((abs - d as f64)*60.0).floor() as u32;
    let s = (abs - d as f64 - m as f64/60.0)*3600.0;
    let mut s = (s*SECONDS_DENOMINATOR as f64).round() as u32;

    // Rounding may give a full minute
    if s >= 60*SECONDS_DENOMINATOR {
        s -= 60*SECONDS_DENOMINATOR;
        m += 1;
    }
    if m >= 60 {
        m -= 60;
        d += 1;
    }

    [(d, 1), (m, 1), (s, SECONDS_DENOMINATOR)]
}

fn rationals(parts: &[(u32, u32)]) -> Vec<uR64> {
    parts.iter()
        .map(|(n, d)| uR64 { nominator: *n, denominator: *d })
        .collect()
}

pub struct ExifGeoTagger;

impl GeoTagger for ExifGeoTagger {
    fn write_gps_tags(&self, fname: &Path, point: &GeoPoint) -> Result<()> {
        let geotag_error = |reason: String| Error::Geotag {
            path: fname.to_path_buf(),
            reason: reason,
        };

        // Photos without an EXIF block start from empty metadata
        let mut metadata = Metadata::new_from_path(fname)
            .unwrap_or_else(|_| Metadata::new());

        let lat_ref = if point.lat < 0.0 { "S" } else { "N" };
        let lng_ref = if point.lng < 0.0 { "W" } else { "E" };
        let alt = point.alt_or_zero();

        metadata.set_tag(ExifTag::GPSVersionID(vec![2, 3, 0, 0]));
        metadata.set_tag(ExifTag::GPSLatitudeRef(lat_ref.to_string()));
        metadata.set_tag(ExifTag::GPSLatitude(rationals(&to_dms(point.lat))));
        metadata.set_tag(ExifTag::GPSLongitudeRef(lng_ref.to_string()));
        metadata.set_tag(ExifTag::GPSLongitude(rationals(&to_dms(point.lng))));
        metadata.set_tag(ExifTag::GPSAltitudeRef(
            vec![if alt < 0.0 { 1 } else { 0 }]));
        metadata.set_tag(ExifTag::GPSAltitude(rationals(&[(
            (alt.abs()*ALTITUDE_DENOMINATOR as f64).round() as u32,
            ALTITUDE_DENOMINATOR,
        )])));

        metadata.write_to_file(fname)
            .map_err(|e| geotag_error(e.to_string()))?;
        debug!("Tagged {} with {}", fname.display(), point);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_of_pittsburgh() {
        let [d, m, s] = to_dms(40.4441647);
        assert_eq!(d, (40, 1));
        assert_eq!(m, (26, 1));
        assert_eq!(s, (389929, SECONDS_DENOMINATOR));

        let [d, m, _] = to_dms(-79.9433725);
        assert_eq!(d, (79, 1));
        assert_eq!(m, (56, 1));
    }

    #[test]
    fn rounded_seconds_carry_into_degrees() {
        assert_eq!(to_dms(40.99999999),
                   [(41, 1), (0, 1), (0, SECONDS_DENOMINATOR)]);

        // 12 deg 30 min 59.99999 sec
        let [d, m, s] = to_dms(12.0 + 30.0/60.0 + 59.99999/3600.0);
        assert_eq!(d, (12, 1));
        assert_eq!(m, (31, 1));
        assert_eq!(s, (0, SECONDS_DENOMINATOR));
    }

    #[test]
    fn whole_degrees() {
        assert_eq!(to_dms(12.0), [(12, 1), (0, 1), (0, SECONDS_DENOMINATOR)]);
    }
}
