use crate::{
    ensure_config, ensure_domain,
    error::Result,
    prelude::{Date, Real},
};
use serde::{Deserialize, Serialize};

///////////////////////////////////////////////////////////////////////////////
// Default constants for COVID-19 projections
///////////////////////////////////////////////////////////////////////////////

/// Minimal incubation period, in days.
pub const INCUBATION_DAYS: usize = 2;
/// Distribution of infections by days after INCUBATION_DAYS. Mean serial
/// interval of 5 days.
pub const INFECTIOUS_DAYS: [Real; 7] = [0.5, 1., 2., 3., 2., 1., 0.5];
/// Distribution of deaths by days after exposure, centered around
/// DAYS_BEFORE_DEATH.
pub const DEATHS_DAYS: [Real; 15] = [1.; 15];
pub const DAYS_BEFORE_DEATH: usize = 22;
pub const REPORT_LAG_DAYS: usize = 21;
pub const REPORT_LAG_DECAY: Real = 0.8;

pub const MORTALITY_MULTIPLIER: Real = 0.995;
pub const MORTALITY_MULTIPLIER_REOPEN: Real = 0.98;
pub const MIN_MORTALITY_MULTIPLIER: Real = 0.3;
pub const MIN_IFR: Real = 0.0025;

pub const DAYS_UNTIL_HOSPITALIZATION: usize = 12;
pub const HOSPITALIZATION_RATE: Real = 0.034;
pub const DAYS_IN_HOSPITAL: usize = 11;

pub const IMMUNITY_MULTIPLIER: Real = 0.5;
pub const IMMUNITY_MULTIPLIER_US_SUBREGION: Real = 0.3;

pub const DAYS_UNTIL_LOCKDOWN_FATIGUE: i64 = 28;
pub const MAX_POST_REOPEN_R: Real = 1.16;
pub const DEFAULT_REOPEN_SHIFT_DAYS: i64 = 15;
pub const DAYS_WITH_IMPORTS: usize = 100;

/// Triangular distribution support and mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangularRange {
    pub low: Real,
    pub mode: Real,
    pub high: Real,
}

impl TriangularRange {
    pub const fn new(low: Real, mode: Real, high: Real) -> Self {
        TriangularRange { low, mode, high }
    }

    fn validate(&self, name: &str) -> Result<()> {
        ensure_config!(
            self.low < self.high && self.low <= self.mode && self.mode <= self.high,
            "{} range must satisfy low <= mode <= high and low < high: {:?}",
            name,
            self
        );
        Ok(())
    }
}

/// How R evolves once the reopening transition is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostReopenModel {
    /// A second sigmoid moves R from the reopening level towards the
    /// post-reopen equilibrium R.
    Equilibrium,
    /// R decays geometrically by POST_REOPENING_R_DECAY each day after the
    /// reopening settles.
    GeometricDecay,
}

impl Default for PostReopenModel {
    fn default() -> Self {
        PostReopenModel::Equilibrium
    }
}

/// Thresholds of the reproduction number trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionConstants {
    pub days_until_lockdown_fatigue: i64,
    pub fatigue_rate: Real,
    pub apply_fatigue: bool,
    pub default_reopen_shift_days: i64,
    pub default_reopen_inflection: Real,
    pub max_post_reopen_r: Real,
    pub subregion_post_reopen_r_bonus: Real,
    pub larger_second_wave_post_reopen_r_factor: Real,
    /// Equilibrium sigmoid is centered 2 * factor / REOPEN_INFLECTION days
    /// after the reopening.
    pub equilibrium_shift_factor: Real,
    pub post_reopen_model: PostReopenModel,
    pub days_until_post_reopening: i64,
    pub days_until_post_reopening_low_r: i64,
    pub max_post_reopening_total_decay: Real,
    pub fall_start_date: Date,
    pub fall_lead_days: i64,
    pub min_fall_r_multiplier: Real,
    pub max_fall_r_multiplier: Real,
    pub stability_tolerance: Real,
    /// Local transmission on a day never exceeds the remaining susceptibles.
    pub cap_at_susceptible: bool,
}

impl Default for TransmissionConstants {
    fn default() -> Self {
        TransmissionConstants {
            days_until_lockdown_fatigue: DAYS_UNTIL_LOCKDOWN_FATIGUE,
            fatigue_rate: 0.2,
            apply_fatigue: true,
            default_reopen_shift_days: DEFAULT_REOPEN_SHIFT_DAYS,
            default_reopen_inflection: 0.2,
            max_post_reopen_r: MAX_POST_REOPEN_R,
            subregion_post_reopen_r_bonus: 0.1,
            larger_second_wave_post_reopen_r_factor: 2.0,
            equilibrium_shift_factor: 5.0,
            post_reopen_model: PostReopenModel::Equilibrium,
            days_until_post_reopening: 15,
            days_until_post_reopening_low_r: 30,
            max_post_reopening_total_decay: 0.9,
            fall_start_date: Date::from_ymd_opt(2020, 9, 22).unwrap_or_default(),
            fall_lead_days: 30,
            min_fall_r_multiplier: 0.9,
            max_fall_r_multiplier: 1.2,
            stability_tolerance: 0.1,
            cap_at_susceptible: true,
        }
    }
}

/// Infection fatality ratio decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityConstants {
    pub mortality_multiplier: Real,
    pub reopen_mortality_multiplier: Real,
    pub min_mortality_multiplier: Real,
    pub min_ifr: Real,
    pub early_decay_start_day: usize,
    pub late_decay_start_day: usize,
    pub max_days_accelerated_decay: usize,
}

impl Default for MortalityConstants {
    fn default() -> Self {
        MortalityConstants {
            mortality_multiplier: MORTALITY_MULTIPLIER,
            reopen_mortality_multiplier: MORTALITY_MULTIPLIER_REOPEN,
            min_mortality_multiplier: MIN_MORTALITY_MULTIPLIER,
            min_ifr: MIN_IFR,
            early_decay_start_day: 30,
            late_decay_start_day: 120,
            max_days_accelerated_decay: 30,
        }
    }
}

/// Fraction of true deaths that are never reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndetectedConstants {
    pub enabled: bool,
    pub initial_ratio: Real,
    pub early_min_ratio: Real,
    pub early_days_until_min: usize,
    pub late_min_ratio: Real,
    pub late_days_until_min: usize,
}

impl Default for UndetectedConstants {
    fn default() -> Self {
        UndetectedConstants {
            enabled: true,
            initial_ratio: 1.0,
            early_min_ratio: 0.05,
            early_days_until_min: 45,
            late_min_ratio: 0.1,
            late_days_until_min: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImmunityConstants {
    pub multiplier: Real,
    pub us_subregion_multiplier: Real,
    pub large_population_multiplier: Real,
    pub large_population_threshold_millions: Real,
    pub large_population_rate: Real,
}

impl Default for ImmunityConstants {
    fn default() -> Self {
        ImmunityConstants {
            multiplier: IMMUNITY_MULTIPLIER,
            us_subregion_multiplier: IMMUNITY_MULTIPLIER_US_SUBREGION,
            large_population_multiplier: 1.0,
            large_population_threshold_millions: 20.0,
            large_population_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalConstants {
    pub days_until_hospitalization: usize,
    pub days_in_hospital: usize,
    pub hospitalization_rate: Real,
}

impl Default for HospitalConstants {
    fn default() -> Self {
        HospitalConstants {
            days_until_hospitalization: DAYS_UNTIL_HOSPITALIZATION,
            days_in_hospital: DAYS_IN_HOSPITAL,
            hospitalization_rate: HOSPITALIZATION_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConstants {
    pub beginning_days_flat: usize,
    pub days_with_imports: usize,
    pub min_daily_imports: Real,
    pub min_daily_imports_fraction: Real,
}

impl Default for ImportConstants {
    fn default() -> Self {
        ImportConstants {
            beginning_days_flat: 10,
            days_with_imports: DAYS_WITH_IMPORTS,
            min_daily_imports: 10.0,
            min_daily_imports_fraction: 0.1,
        }
    }
}

/// Distributions used to draw parameters that were not given explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationConstants {
    pub custom_post_reopening_r_decay: Option<TriangularRange>,
    pub post_reopening_r_decay_us: TriangularRange,
    pub post_reopening_r_decay_early: TriangularRange,
    pub post_reopening_r_decay_seasonal: TriangularRange,
    pub post_reopening_r_decay_other: TriangularRange,
    pub fall_r_multiplier: TriangularRange,
}

impl Default for RandomizationConstants {
    fn default() -> Self {
        RandomizationConstants {
            custom_post_reopening_r_decay: None,
            post_reopening_r_decay_us: TriangularRange::new(0.993, 0.996, 0.999),
            post_reopening_r_decay_early: TriangularRange::new(0.995, 0.998, 0.999),
            post_reopening_r_decay_seasonal: TriangularRange::new(0.995, 0.9975, 1.0),
            post_reopening_r_decay_other: TriangularRange::new(0.996, 0.998, 1.0),
            fall_r_multiplier: TriangularRange::new(0.998, 1.001, 1.005),
        }
    }
}

/// Every constant used by the trajectory builders and the simulation engine.
///
/// Defaults reproduce the production configuration. Any field may be
/// overridden from TOML, e.g. `[transmission] stability_tolerance = 0.2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    pub incubation_days: usize,
    pub days_before_death: usize,
    pub infectious_days: Vec<Real>,
    pub deaths_days: Vec<Real>,
    pub report_lag_days: usize,
    pub report_lag_decay: Real,
    pub transmission: TransmissionConstants,
    pub mortality: MortalityConstants,
    pub undetected: UndetectedConstants,
    pub immunity: ImmunityConstants,
    pub hospital: HospitalConstants,
    pub imports: ImportConstants,
    pub randomization: RandomizationConstants,
}

impl Default for ModelConstants {
    fn default() -> Self {
        ModelConstants {
            incubation_days: INCUBATION_DAYS,
            days_before_death: DAYS_BEFORE_DEATH,
            infectious_days: INFECTIOUS_DAYS.to_vec(),
            deaths_days: DEATHS_DAYS.to_vec(),
            report_lag_days: REPORT_LAG_DAYS,
            report_lag_decay: REPORT_LAG_DECAY,
            transmission: Default::default(),
            mortality: Default::default(),
            undetected: Default::default(),
            immunity: Default::default(),
            hospital: Default::default(),
            imports: Default::default(),
            randomization: Default::default(),
        }
    }
}

impl ModelConstants {
    /// Load constants from TOML source. Missing fields keep their defaults.
    pub fn from_toml(src: &str) -> Result<Self> {
        let constants: ModelConstants = toml::from_str(src)
            .map_err(|e| crate::error::ProjectionError::config(format!("invalid constants: {}", e)))?;
        constants.validate()?;
        Ok(constants)
    }

    /// Shortest window, exclusive, that still holds the delay between an
    /// infection and its expected death.
    pub fn death_horizon(&self) -> usize {
        self.days_before_death
    }

    /// Number of initial days seeded with imported cases only.
    pub fn seeding_days(&self) -> usize {
        self.incubation_days + self.infectious_days.len()
    }

    /// Check internal consistency of constants.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transmission;
        let m = &self.mortality;
        let u = &self.undetected;
        let h = &self.hospital;

        ensure_domain!(!self.infectious_days.is_empty(), "infectious kernel is empty");
        ensure_domain!(
            self.deaths_days.len() % 2 == 1,
            "deaths kernel must have odd length, got {}",
            self.deaths_days.len()
        );
        ensure_domain!(
            self.days_before_death >= self.deaths_days.len() / 2,
            "days before death ({}) must cover half the deaths kernel ({})",
            self.days_before_death,
            self.deaths_days.len() / 2
        );
        ensure_domain!(self.report_lag_days > 0, "report lag kernel is empty");
        ensure_config!(
            0.0 < self.report_lag_decay && self.report_lag_decay <= 1.0,
            "report lag decay must be in (0, 1], got {}",
            self.report_lag_decay
        );
        ensure_config!(
            t.stability_tolerance > 0.0,
            "stability tolerance must be positive, got {}",
            t.stability_tolerance
        );
        ensure_config!(
            0.0 < t.default_reopen_inflection && t.default_reopen_inflection <= 1.0,
            "default reopen inflection must be in (0, 1], got {}",
            t.default_reopen_inflection
        );
        ensure_config!(
            t.equilibrium_shift_factor > 0.0,
            "equilibrium shift factor must be positive"
        );
        ensure_config!(
            0.0 < t.min_fall_r_multiplier && t.min_fall_r_multiplier <= t.max_fall_r_multiplier,
            "fall multiplier bounds are inconsistent: [{}, {}]",
            t.min_fall_r_multiplier,
            t.max_fall_r_multiplier
        );
        ensure_config!(
            0.9 <= m.mortality_multiplier && m.mortality_multiplier <= 1.1,
            "mortality multiplier must be in [0.9, 1.1], got {}",
            m.mortality_multiplier
        );
        ensure_config!(
            0.0 < m.reopen_mortality_multiplier && m.reopen_mortality_multiplier <= 1.0,
            "reopen mortality multiplier must be in (0, 1], got {}",
            m.reopen_mortality_multiplier
        );
        ensure_config!(
            0.0 < m.min_mortality_multiplier && m.min_mortality_multiplier < 1.0,
            "min mortality multiplier must be in (0, 1), got {}",
            m.min_mortality_multiplier
        );
        ensure_config!(m.min_ifr > 0.0, "min IFR must be positive");
        ensure_config!(
            0.0 <= u.early_min_ratio
                && u.early_min_ratio <= u.initial_ratio
                && 0.0 <= u.late_min_ratio
                && u.late_min_ratio <= u.initial_ratio
                && u.initial_ratio <= 1.0,
            "undetected ratios must satisfy 0 <= min <= initial <= 1"
        );
        ensure_config!(
            u.early_days_until_min > 0 && u.late_days_until_min > 0,
            "undetected ramp lengths must be positive"
        );
        ensure_config!(
            0.0 <= h.hospitalization_rate && h.hospitalization_rate <= 1.0,
            "hospitalization rate must be in [0, 1], got {}",
            h.hospitalization_rate
        );

        let r = &self.randomization;
        if let Some(range) = &r.custom_post_reopening_r_decay {
            range.validate("custom post reopening R decay")?;
        }
        r.post_reopening_r_decay_us.validate("US post reopening R decay")?;
        r.post_reopening_r_decay_early.validate("early post reopening R decay")?;
        r.post_reopening_r_decay_seasonal.validate("seasonal post reopening R decay")?;
        r.post_reopening_r_decay_other.validate("post reopening R decay")?;
        r.fall_r_multiplier.validate("fall R multiplier")?;
        Ok(())
    }
}
