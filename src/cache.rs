use crate::error::Result;
use crate::point::GeoPoint;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// On-disk form of a resolved address
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize, Serialize, Default, Debug)]
struct CacheFile {
    #[serde(default)]
    addresses: BTreeMap<String, LatLng>,
}

#[derive(Debug)]
pub struct AddressCache {
    fname: PathBuf,
    data: CacheFile,
}

impl AddressCache {
    pub fn load(fname: &Path) -> Result<Self> {
        let data = if fname.is_file() {
            let reader = BufReader::new(File::open(fname)?);
            serde_json::from_reader(reader)?
        }
        else {
            info!("{} does not exist", fname.display());
            CacheFile::default()
        };

        Ok(Self {
            fname: fname.to_path_buf(),
            data: data,
        })
    }

    pub fn get(&self, address: &str) -> Option<GeoPoint> {
        self.data.addresses.get(address)
            .and_then(|ll| GeoPoint::new(ll.lat, ll.lng).ok())
    }

    pub fn len(&self) -> usize {
        self.data.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.addresses.is_empty()
    }

    pub fn insert(&mut self, address: &str, p: &GeoPoint) -> Result<()> {
        self.data.addresses.insert(address.to_string(),
                                   LatLng { lat: p.lat, lng: p.lng });
        self.store()
    }

    fn store(&self) -> Result<()> {
        if let Some(dir) = self.fname.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.fname)?);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer.flush()?;
        debug!("Stored {} addresses to {}", self.len(), self.fname.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("gmapaddresses.json");
        let addr = "5000 Forbes Ave, Pittsburgh, PA 15213";
        let p = GeoPoint::new(40.44416469999999, -79.9433725).unwrap();

        let mut cache = AddressCache::load(&fname).unwrap();
        assert!(cache.is_empty());
        cache.insert(addr, &p).unwrap();

        let reloaded = AddressCache::load(&fname).unwrap();
        assert_eq!(reloaded.get(addr), Some(p));
        assert_eq!(reloaded.get("elsewhere"), None);
    }

    #[test]
    fn file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("cache.json");
        let mut cache = AddressCache::load(&fname).unwrap();
        cache.insert("a", &GeoPoint::new(1.5, -2.5).unwrap()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&fname).unwrap()).unwrap();
        assert_eq!(raw["addresses"]["a"]["lat"], 1.5);
        assert_eq!(raw["addresses"]["a"]["lng"], -2.5);
    }

    #[test]
    fn later_entries_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("cache.json");
        let mut cache = AddressCache::load(&fname).unwrap();
        cache.insert("a", &GeoPoint::new(1.0, 1.0).unwrap()).unwrap();
        cache.insert("b", &GeoPoint::new(2.0, 2.0).unwrap()).unwrap();
        cache.insert("a", &GeoPoint::new(3.0, 3.0).unwrap()).unwrap();

        let reloaded = AddressCache::load(&fname).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("a"), Some(GeoPoint::new(3.0, 3.0).unwrap()));
    }
}
