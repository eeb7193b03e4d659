use crate::error::{Error, Result};

use config::{*, ext::*};
use lazy_regex::regex_is_match;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_headings() -> String { "0;90;180;270".to_string() }
fn default_pitch() -> f64 { 0.0 }
fn default_imgsize() -> String { "640x640".to_string() }
fn default_imgdir() -> String { "./images".to_string() }
fn default_mapon() -> bool { true }
fn default_linepts() -> usize { 3 }
fn default_pos() -> f32 { 100.0 }
fn default_fig_size() -> f32 { 1000.0 }
fn default_showtime() -> f64 { 1.0 }
fn default_addressfile() -> String { "./gmapaddresses.json".to_string() }
fn default_logfile() -> String { "./gatebilde.log".to_string() }
fn default_mapzoom() -> u8 { 15 }

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Settings {
    #[serde(rename = "HEADINGS", default = "default_headings")]
    pub headings: String,
    #[serde(rename = "PITCH", default = "default_pitch")]
    pub pitch: f64,
    #[serde(rename = "IMGSIZE", default = "default_imgsize")]
    pub imgsize: String,
    #[serde(rename = "IMGDIR", default = "default_imgdir")]
    pub imgdir: String,
    #[serde(rename = "PLOTON", default)]
    pub plot_on: bool,
    #[serde(rename = "MAPON", default = "default_mapon")]
    pub map_on: bool,
    #[serde(rename = "CLEAN", default)]
    pub clean: bool,
    #[serde(rename = "LINEPTS", default = "default_linepts")]
    pub linepts: usize,
    #[serde(rename = "XPOS", default = "default_pos")]
    pub xpos: f32,
    #[serde(rename = "YPOS", default = "default_pos")]
    pub ypos: f32,
    #[serde(rename = "FIGWIDTH", default = "default_fig_size")]
    pub fig_width: f32,
    #[serde(rename = "FIGHEIGHT", default = "default_fig_size")]
    pub fig_height: f32,
    #[serde(rename = "SHOWTIME", default = "default_showtime")]
    pub showtime: f64,
    #[serde(rename = "GAPIKEY", default)]
    pub api_key: String,
    #[serde(rename = "ADDRESSFILE", default = "default_addressfile")]
    pub address_file: String,
    #[serde(rename = "LOGFILE", default = "default_logfile")]
    pub log_file: String,
    #[serde(rename = "MAPZOOM", default = "default_mapzoom")]
    pub map_zoom: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            headings: default_headings(),
            pitch: default_pitch(),
            imgsize: default_imgsize(),
            imgdir: default_imgdir(),
            plot_on: false,
            map_on: default_mapon(),
            clean: false,
            linepts: default_linepts(),
            xpos: default_pos(),
            ypos: default_pos(),
            fig_width: default_fig_size(),
            fig_height: default_fig_size(),
            showtime: default_showtime(),
            api_key: "".to_string(),
            address_file: default_addressfile(),
            log_file: default_logfile(),
            map_zoom: default_mapzoom(),
        }
    }
}

impl Settings {
    pub fn load(fname: &Path) -> Result<Self> {
        let config_error = |reason: String| Error::Config(
            format!("cannot read {}: {}", fname.display(), reason));

        // The json provider panics on malformed files, so parse it first
        if fname.is_file() {
            let reader = BufReader::new(File::open(fname)?);
            serde_json::from_reader::<_, serde_json::Value>(reader)
                .map_err(|e| config_error(e.to_string()))?;
        }
        else {
            debug!("{} does not exist, using defaults", fname.display());
        }

        let config = DefaultConfigurationBuilder::new()
            .add_json_file(PathBuf::from(fname).is().optional())
            .add_env_vars_with_prefix("GATEBILDE_")
            .build()
            .map_err(|e| config_error(format!("{:?}", e)))?;

        let mut settings: Settings = from_config((*config).as_ref())
            .map_err(|e| config_error(e.to_string()))?;
        // Headings may be given comma separated
        settings.headings = settings.headings.replace(',', ";");

        Ok(settings)
    }

    fn parse_float(key: &str, value: &str) -> Result<f64> {
        value.trim().parse()
            .map_err(|_| Error::Config(
                format!("invalid value '{}' for {}", value, key)))
    }

    fn parse_bool(key: &str, value: &str) -> Result<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" => Ok(false),
            _ => Err(Error::Config(
                format!("invalid value '{}' for {}", value, key))),
        }
    }

    fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value.trim().parse()
            .map_err(|_| Error::Config(
                format!("invalid value '{}' for {}", value, key)))
    }

    // Overrides a single setting by its configuration key. On error the
    // setting is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "HEADINGS" => {
                self.headings = value.replace(',', ";");
            },
            "PITCH" => {
                self.pitch = Settings::parse_float(key, value)?;
            },
            "IMGSIZE" => {
                self.imgsize = value.to_string();
            },
            "IMGDIR" => {
                self.imgdir = value.to_string();
            },
            "PLOTON" => {
                self.plot_on = Settings::parse_bool(key, value)?;
            },
            "MAPON" => {
                self.map_on = Settings::parse_bool(key, value)?;
            },
            "CLEAN" => {
                self.clean = Settings::parse_bool(key, value)?;
            },
            "LINEPTS" => {
                self.linepts = Settings::parse_int(key, value)?;
            },
            "XPOS" => {
                self.xpos = Settings::parse_float(key, value)? as f32;
            },
            "YPOS" => {
                self.ypos = Settings::parse_float(key, value)? as f32;
            },
            "FIGWIDTH" => {
                self.fig_width = Settings::parse_float(key, value)? as f32;
            },
            "FIGHEIGHT" => {
                self.fig_height = Settings::parse_float(key, value)? as f32;
            },
            "SHOWTIME" => {
                self.showtime = Settings::parse_float(key, value)?;
            },
            "GAPIKEY" => {
                self.api_key = value.to_string();
            },
            "ADDRESSFILE" => {
                self.address_file = value.to_string();
            },
            "LOGFILE" => {
                self.log_file = value.to_string();
            },
            "MAPZOOM" => {
                self.map_zoom = Settings::parse_int(key, value)?;
            },
            s => {
                return Err(Error::Config(format!("unknown setting '{}'", s)));
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("no GAPIKEY".to_string()));
        }

        if !regex_is_match!(r"^\d+x\d+$", &self.imgsize) {
            return Err(Error::Config(
                format!("IMGSIZE must be <width>x<height>, got '{}'",
                        self.imgsize)));
        }

        let headings = self.heading_list();
        if headings.is_empty() {
            return Err(Error::Config("HEADINGS is empty".to_string()));
        }
        for h in &headings {
            if h.parse::<f64>().is_err() {
                return Err(Error::Config(
                    format!("invalid heading '{}' in HEADINGS", h)));
            }
        }

        if self.showtime < 0.0 {
            return Err(Error::Config("SHOWTIME must not be negative"
                                     .to_string()));
        }

        Ok(())
    }

    pub fn heading_list(&self) -> Vec<String> {
        self.headings.split(';')
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(|h| h.to_string())
            .collect()
    }

    pub fn image_dir(&self) -> PathBuf {
        PathBuf::from(&self.imgdir)
    }

    pub fn log_settings(&self) {
        debug!("HEADINGS:    {}", self.headings);
        debug!("PITCH:       {}", self.pitch);
        debug!("IMGSIZE:     {}", self.imgsize);
        debug!("IMGDIR:      {}", self.imgdir);
        debug!("PLOTON:      {}", self.plot_on);
        debug!("MAPON:       {}", self.map_on);
        debug!("CLEAN:       {}", self.clean);
        debug!("LINEPTS:     {}", self.linepts);
        debug!("XPOS/YPOS:   {}/{}", self.xpos, self.ypos);
        debug!("FIGURE:      {}x{}", self.fig_width, self.fig_height);
        debug!("SHOWTIME:    {}", self.showtime);
        debug!("ADDRESSFILE: {}", self.address_file);
    }
}
