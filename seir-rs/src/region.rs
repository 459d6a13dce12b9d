//! Identification and metadata for the region being projected, plus the
//! calendar window of the simulation.
use crate::{
    ensure_config,
    error::Result,
    prelude::{Date, DayIdx, Real},
    utils::date_range,
};
use chrono::Duration;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Region name used for country-wide projections.
pub const ALL_REGIONS: &str = "ALL";

/// Names of the country, region and (optional) subregion being projected.
///
/// Only country and region class affect computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct RegionIdentity {
    country: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    subregion: Option<String>,
}

impl RegionIdentity {
    pub fn new(country: &str, region: Option<&str>, subregion: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(String::from);
        RegionIdentity {
            country: country.to_string(),
            region: non_empty(region),
            subregion: non_empty(subregion),
        }
    }

    /// A country-wide region.
    pub fn for_country(country: &str) -> Self {
        Self::new(country, None, None)
    }

    pub fn is_us(&self) -> bool {
        self.country == "US"
    }

    /// True for anything smaller than a whole country: a subregion, or a
    /// region other than ALL (e.g. a US state).
    pub fn is_subregion(&self) -> bool {
        self.subregion.is_some()
            || self
                .region
                .as_deref()
                .map_or(false, |r| r != ALL_REGIONS)
    }
}

impl fmt::Display for RegionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.country,
            self.region.as_deref().unwrap_or(""),
            self.subregion.as_deref().unwrap_or("")
        )
    }
}

/// Static information about the region. Read-only for projections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct RegionMetadata {
    population: u64,
    hospital_beds_per_1000: Real,
}

impl RegionMetadata {
    pub fn new(population: u64, hospital_beds_per_1000: Real) -> Result<Self> {
        ensure_config!(population > 0, "population must be positive");
        ensure_config!(
            hospital_beds_per_1000 >= 0.0,
            "hospital beds per 1000 must be non-negative, got {}",
            hospital_beds_per_1000
        );
        Ok(RegionMetadata {
            population,
            hospital_beds_per_1000,
        })
    }

    /// Total number of hospital beds in the region.
    pub fn hospital_beds(&self) -> u64 {
        (self.population as Real / 1000.0 * self.hospital_beds_per_1000) as u64
    }
}

/// Calendar range covered by a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SimulationWindow {
    first_date: Date,
    projection_create_date: Option<Date>,
    projection_end_date: Date,
}

impl SimulationWindow {
    pub fn new(
        first_date: Date,
        projection_create_date: Option<Date>,
        projection_end_date: Date,
    ) -> Result<Self> {
        ensure_config!(
            first_date <= projection_end_date,
            "first date {} must not be after projection end date {}",
            first_date,
            projection_end_date
        );
        if let Some(create) = projection_create_date {
            ensure_config!(
                first_date < create,
                "first date {} must be before projection create date {}",
                first_date,
                create
            );
            ensure_config!(
                create < projection_end_date,
                "projection create date {} must be before projection end date {}",
                create,
                projection_end_date
            );
        }
        Ok(SimulationWindow {
            first_date,
            projection_create_date,
            projection_end_date,
        })
    }

    /// Number of simulated days, both ends included.
    pub fn n_days(&self) -> usize {
        ((self.projection_end_date - self.first_date).num_days() + 1) as usize
    }

    /// Day index of date. Negative for dates before the first date.
    pub fn day_idx(&self, date: Date) -> DayIdx {
        (date - self.first_date).num_days()
    }

    /// Date corresponding to a day index.
    pub fn date_at(&self, day_idx: DayIdx) -> Date {
        self.first_date + Duration::days(day_idx)
    }

    /// All dates in the window.
    pub fn dates(&self) -> Vec<Date> {
        date_range(self.first_date, self.projection_end_date)
    }
}
