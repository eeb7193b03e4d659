use gatebilde::config::VALID_RUNS;
use gatebilde::display::{ImageViewer, NoViewer, WindowViewer};
use gatebilde::geotag::ExifGeoTagger;
use gatebilde::google::GoogleMaps;
use gatebilde::{logging, Config, Pipeline, Services, Settings};

use log::{error, info};
use std::process::ExitCode;

fn run_all(config: &Config, settings: &Settings) -> Result<bool, String> {
    let maps = GoogleMaps::new(&settings.api_key).map_err(|e| e.to_string())?;
    let tagger = ExifGeoTagger;
    let viewer: &dyn ImageViewer = if settings.plot_on {
        &WindowViewer
    } else {
        &NoViewer
    };

    let services = Services {
        geocoder: &maps,
        directions: &maps,
        photos: &maps,
        maps: &maps,
        tagger: &tagger,
        viewer: viewer,
    };
    let mut pipeline = Pipeline::new(settings, services)
        .map_err(|e| e.to_string())?
        .with_random_heading(config.random_heading);

    let mut ok = true;

    for run in config.runs() {
        info!("Starting run {}", run);

        let result = match run {
            "list" => {
                info!("Valid runs: {}", VALID_RUNS.join(", "));
                Ok(vec![])
            },
            "p2p" => {
                let (a, b) = config.segment();
                pipeline.run_segment(a, b, "CMUSPT", settings.linepts)
            },
            "address" => pipeline.run_address(config.address()),
            "track" => {
                let (fname, name) = config.track();
                pipeline.run_track(&fname, name)
            },
            "point" => pipeline.run_point(&config.point(), "PTRUN"),
            "directions" => pipeline.run_directions(config.route(), "DIRRUN"),
            _ => Ok(vec![]),
        };

        match result {
            Ok(artifacts) => {
                info!("Run {} done, {} photos", run, artifacts.len());
            },
            Err(e) => {
                error!("Run {} failed: {}", run, e);
                ok = false;
            },
        }
    }

    Ok(ok)
}

fn main() -> ExitCode {
    let config = Config::new();

    let mut settings = match Settings::load(&config.jsonconfig) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };

    logging::init(&settings.log_file);
    config.apply(&mut settings);

    info!("PLOTON is {}; CLEAN is {}", settings.plot_on, settings.clean);
    settings.log_settings();

    if let Err(e) = settings.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    if config.runs().is_empty() {
        error!("No runs specified, use -t list to get the valid runs. \
                Exiting");
        return ExitCode::FAILURE;
    }

    match run_all(&config, &settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
