use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::settings::Settings;

use clap::{arg, ArgMatches};
use log::error;
use std::ffi::OsString;
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles =
    clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

// Runs in the order they are executed.
pub const VALID_RUNS: [&str; 6] = [
    "list", "p2p", "address", "track", "point", "directions",
];

pub const DEFAULT_CONFIG_FILE: &str = "./gmapconfig.json";

// Demo inputs used when the command line leaves one out
pub const WORK_ADDRESS: &str = "5000 Forbes Ave, Pittsburgh, PA 15213";
pub const DEFAULT_ROUTE: &str =
    "start='417 S Craig St, Pittsburgh, PA 15213';\
     end='4125 Schenley Dr., Pittsburgh, PA 15213'";
pub const WORK_POINT: GeoPoint = GeoPoint {
    lat: 40.44416469999999,
    lng: -79.9433725,
    alt: None,
};
pub const CIC_POINT: GeoPoint = GeoPoint {
    lat: 40.444837,
    lng: -79.9471412,
    alt: None,
};
pub const WALNUT_POINT: GeoPoint = GeoPoint {
    lat: 40.45066718053887,
    lng: -79.93559640239131,
    alt: None,
};
pub const DEFAULT_TRACK_FILE: &str = "Floor2.kml";
pub const DEFAULT_TRACK_NAME: &str = "Walnut2";

#[derive(Debug, Default)]
pub struct Config {
    pub jsonconfig: PathBuf,
    pub runs: Option<String>,
    pub headings: Option<String>,
    pub pitch: Option<String>,
    pub linepts: Option<String>,
    pub plot: bool,
    pub clean: bool,
    pub latlong: Option<String>,
    pub address: Option<String>,
    pub route: Option<String>,
    pub segment: Option<String>,
    pub track: Option<String>,
    pub name: Option<String>,
    pub random_heading: bool,
}

impl Config {
    fn command() -> clap::Command {
        clap::Command::new("gatebilde")
            .bin_name("gatebilde")
            .about("Fetch geotagged street level photos along a route")
            .styles(CLAP_STYLING)
            .args([
                arg!(-d --headings <STRING>
                     "use STRING as headings (comma separated list)"),
                arg!(-j --jsonconfig <FILE> "use FILE as configuration file"),
                arg!(-a --pitch <FLOAT> "use FLOAT as the pitch of the photo"),
                arg!(-p --points <INT> "use INT as # of points in a p2p run"),
                arg!(-P --plot "Plot the downloaded images"),
                arg!(-C --clean "Delete downloaded images before exit"),
                arg!(-t --run <LIST>
                     "runs to do (comma separated list); 'all' for every \
                      run; 'list' to get valid runs"),
                arg!(-L --latlong <STRING> "use STRING as 'lat,lng' pair"),
                arg!(-A --address <STRING> "use STRING as street address"),
                arg!(-R --route <STRING>
                     "use STRING as start=<START ADDRESS>;end=<END ADDRESS>"),
                arg!(-S --segment <STRING>
                     "use STRING as 'lat,lng;lat,lng' end points of a p2p run"),
                arg!(-T --track <FILE> "read the track run from FILE (.kml or .gpx)"),
                arg!(-n --name <NAME> "name of the line in the track file"),
                arg!(--"random-heading"
                     "request one photo at a random heading per point"),
            ])
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let opt = |id: &str| matches.get_one::<String>(id).cloned();

        Self {
            jsonconfig: PathBuf::from(opt("jsonconfig")
                                      .unwrap_or(DEFAULT_CONFIG_FILE.to_string())),
            runs: opt("run"),
            headings: opt("headings"),
            pitch: opt("pitch"),
            linepts: opt("points"),
            plot: matches.get_flag("plot"),
            clean: matches.get_flag("clean"),
            latlong: opt("latlong"),
            address: opt("address"),
            route: opt("route"),
            segment: opt("segment"),
            track: opt("track"),
            name: opt("name"),
            random_heading: matches.get_flag("random-heading"),
        }
    }

    pub fn new() -> Self {
        Config::from_matches(&Config::command().get_matches())
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where I: IntoIterator<Item = T>, T: Into<OsString> + Clone {
        let matches = Config::command().try_get_matches_from(args)
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Config::from_matches(&matches))
    }

    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = vec![];

        if self.plot {
            overrides.push(("PLOTON", "true".to_string()));
        }
        if self.clean {
            overrides.push(("CLEAN", "true".to_string()));
        }
        if let Some(h) = &self.headings {
            overrides.push(("HEADINGS", h.clone()));
        }
        if let Some(n) = &self.linepts {
            overrides.push(("LINEPTS", n.clone()));
        }
        if let Some(p) = &self.pitch {
            overrides.push(("PITCH", p.clone()));
        }

        overrides
    }

    pub fn apply(&self, settings: &mut Settings) {
        for (key, value) in self.overrides() {
            if let Err(e) = settings.set(key, &value) {
                error!("{}; using default", e);
            }
        }
    }

    pub fn runs(&self) -> Vec<&'static str> {
        let requested: Vec<&str> = match &self.runs {
            Some(r) => r.split(',').map(|s| s.trim()).collect(),
            None => return vec![],
        };

        if requested.contains(&"all") {
            return VALID_RUNS.to_vec();
        }

        VALID_RUNS.iter()
            .filter(|r| requested.contains(r))
            .copied()
            .collect()
    }

    pub fn point(&self) -> GeoPoint {
        match &self.latlong {
            Some(s) => s.parse().unwrap_or_else(|e| {
                error!("{}; using default {}", e, WALNUT_POINT);
                WALNUT_POINT
            }),
            None => WALNUT_POINT,
        }
    }

    pub fn segment(&self) -> (GeoPoint, GeoPoint) {
        let parse = |s: &str| -> Result<(GeoPoint, GeoPoint)> {
            match s.split_once(';') {
                Some((a, b)) => Ok((a.parse()?, b.parse()?)),
                None => Err(Error::InvalidCoordinate(
                    format!("expected 'lat,lng;lat,lng', got '{}'", s))),
            }
        };

        match &self.segment {
            Some(s) => parse(s).unwrap_or_else(|e| {
                error!("{}; using default segment", e);
                (WORK_POINT, CIC_POINT)
            }),
            None => (WORK_POINT, CIC_POINT),
        }
    }

    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(WORK_ADDRESS)
    }

    pub fn route(&self) -> &str {
        self.route.as_deref().unwrap_or(DEFAULT_ROUTE)
    }

    pub fn track(&self) -> (PathBuf, &str) {
        (PathBuf::from(self.track.as_deref().unwrap_or(DEFAULT_TRACK_FILE)),
         self.name.as_deref().unwrap_or(DEFAULT_TRACK_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut all = vec!["gatebilde"];
        all.extend_from_slice(args);
        Config::from_args(all).unwrap()
    }

    #[test]
    fn runs_follow_fixed_order() {
        let c = parse(&["-t", "directions,point,bogus,p2p"]);
        assert_eq!(c.runs(), vec!["p2p", "point", "directions"]);

        let c = parse(&["--run", "all"]);
        assert_eq!(c.runs(), VALID_RUNS.to_vec());

        assert!(parse(&[]).runs().is_empty());
    }

    #[test]
    fn flags_become_overrides() {
        let c = parse(&["-P", "-d", "0,180", "-p", "5", "-a", "10"]);
        assert_eq!(c.overrides(), vec![
            ("PLOTON", "true".to_string()),
            ("HEADINGS", "0,180".to_string()),
            ("LINEPTS", "5".to_string()),
            ("PITCH", "10".to_string()),
        ]);

        let mut settings = Settings::default();
        c.apply(&mut settings);
        assert!(settings.plot_on);
        assert!(!settings.clean);
        assert_eq!(settings.heading_list(), vec!["0", "180"]);
        assert_eq!(settings.linepts, 5);
        assert_eq!(settings.pitch, 10.0);
    }

    #[test]
    fn bad_override_keeps_default() {
        let c = parse(&["-p", "lots"]);
        let mut settings = Settings::default();
        c.apply(&mut settings);
        assert_eq!(settings.linepts, 3);
    }

    #[test]
    fn inputs_fall_back_to_demo_values() {
        let c = parse(&[]);
        assert_eq!(c.point(), WALNUT_POINT);
        assert_eq!(c.segment(), (WORK_POINT, CIC_POINT));
        assert_eq!(c.address(), WORK_ADDRESS);
        assert_eq!(c.track(), (PathBuf::from("Floor2.kml"), "Walnut2"));
        assert_eq!(c.jsonconfig, PathBuf::from(DEFAULT_CONFIG_FILE));

        let c = parse(&["-L", "not a point", "-S", "1,2"]);
        assert_eq!(c.point(), WALNUT_POINT);
        assert_eq!(c.segment(), (WORK_POINT, CIC_POINT));
    }

    #[test]
    fn explicit_inputs() {
        let c = parse(&["-L", "40.5,-79.9", "-S", "40.1,-79.1;40.2,-79.2",
                        "-T", "walk.gpx", "-n", "Penn", "--random-heading"]);
        assert_eq!(c.point(), GeoPoint::new(40.5, -79.9).unwrap());
        assert_eq!(c.segment().1, GeoPoint::new(40.2, -79.2).unwrap());
        assert_eq!(c.track(), (PathBuf::from("walk.gpx"), "Penn"));
        assert!(c.random_heading);
    }
}
