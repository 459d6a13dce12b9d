use std::{env, error::Error, fs};

use log::{info, LevelFilter};
use seir::{prelude::*, utils::seeded_rng};
use serde::{Deserialize, Serialize};
use simple_logger::SimpleLogger;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    country: String,
    region: Option<String>,
    subregion: Option<String>,
    population: u64,
    hospital_beds_per_1000: Real,
    first_date: Option<Date>,
    projection_create_date: Option<Date>,
    projection_end_date: Option<Date>,
    /// Draw uncertain params from a random generator with this seed. The
    /// modes of each distribution are used if not given.
    seed: Option<u64>,
    skip_hospitalizations: bool,
    quarantine_fraction: Real,
    quarantine_effectiveness: Option<QuarantineTier>,
    /// Overrides given as ["NAME", "VALUE"] pairs.
    set_param: Vec<(String, String)>,
    /// Increments given as ["NAME", DELTA] pairs.
    change_param: Vec<(String, Real)>,
    output: Option<String>,
    verbose: bool,
    params: Option<RawParams>,
    constants: ModelConstants,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            country: "US".into(),
            region: None,
            subregion: None,
            population: 332_000_000,
            hospital_beds_per_1000: 2.8,
            first_date: None,
            projection_create_date: None,
            projection_end_date: None,
            seed: None,
            skip_hospitalizations: false,
            quarantine_fraction: 0.0,
            quarantine_effectiveness: None,
            set_param: vec![],
            change_param: vec![],
            output: Some("projection.csv".into()),
            verbose: false,
            params: None,
            constants: ModelConstants::default(),
        }
    }
}

impl Config {
    fn identity(&self) -> RegionIdentity {
        RegionIdentity::new(&self.country, self.region.as_deref(), self.subregion.as_deref())
    }

    fn raw_params(&self) -> seir::error::Result<RawParams> {
        let mut params = self.params.clone().unwrap_or_else(RawParams::default_us);
        for (name, value) in &self.set_param {
            params.set_param_str(name, value)?;
        }
        for (name, delta) in &self.change_param {
            params.change_param(name, *delta)?;
        }
        Ok(params)
    }

    fn window(&self) -> seir::error::Result<SimulationWindow> {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        SimulationWindow::new(
            self.first_date.unwrap_or_else(|| date(2020, 2, 1)),
            self.projection_create_date,
            self.projection_end_date.unwrap_or_else(|| date(2020, 11, 1)),
        )
    }

    fn run_options(&self) -> seir::error::Result<RunOptions> {
        let quarantine = match self.quarantine_effectiveness {
            Some(tier) if self.quarantine_fraction > 0.0 => Some(Quarantine::new(self.quarantine_fraction, tier)?),
            _ => None,
        };
        Ok(RunOptions {
            compute_hospitalizations: !self.skip_hospitalizations,
            quarantine,
        })
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).unwrap_or_else(|| "conf.toml".into());
    let cfg: Config = match fs::read_to_string(&path) {
        Ok(data) => toml::from_str(&data)?,
        Err(_) => Config::default(),
    };

    let level = if cfg.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    SimpleLogger::new().with_level(level).init()?;
    if cfg.verbose {
        println!("{:#?}", cfg);
    }

    let identity = cfg.identity();
    let metadata = RegionMetadata::new(cfg.population, cfg.hospital_beds_per_1000)?;
    let window = cfg.window()?;
    let raw = cfg.raw_params()?;
    let constants = cfg.constants.clone();
    constants.validate()?;

    let projection = match cfg.seed {
        Some(seed) => Projection::with_rng(identity, metadata, window, raw, constants, &mut seeded_rng(seed))?,
        None => Projection::new(identity, metadata, window, raw, constants)?,
    };
    if cfg.verbose {
        for (name, value) in projection.params().to_raw().pairs() {
            println!("{:<28} {}", name, value);
        }
    }

    let output = projection.run_with(&cfg.run_options()?)?;
    info!(
        "{}: {:.0} infections, {:.0} reported deaths, {:.1}% of population infected",
        projection.identity(),
        output.total_infections(),
        output.total_deaths(),
        100.0 * output.final_fraction_infected()
    );
    if let Some(peak) = output.peak_hospitalizations() {
        let beds = metadata.hospital_beds();
        info!("peak hospital occupancy: {:.0} of {} beds", peak, beds);
        if let Some(date) = output.hospital_overflow_date(beds) {
            info!("hospital beds exceeded on {}", date);
        }
    }

    if let Some(fname) = &cfg.output {
        let since = window.projection_create_date().unwrap_or_else(|| window.first_date());
        let mut writer = csv::Writer::from_path(fname)?;
        for row in output.since(since).rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("projection written to {}", fname);
    }
    Ok(())
}
