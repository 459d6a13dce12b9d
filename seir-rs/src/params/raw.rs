use crate::{
    error::{ProjectionError, Result},
    named_params,
    prelude::{Date, Real},
};
use chrono::Duration;
use paste::paste;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single parameter value as it appears in parameter files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(Real),
    Date(Date),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(x) => write!(f, "{}", x),
            ParamValue::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<Real> for ParamValue {
    fn from(x: Real) -> Self {
        ParamValue::Number(x)
    }
}

impl From<Date> for ParamValue {
    fn from(d: Date) -> Self {
        ParamValue::Date(d)
    }
}

fn unknown_param(name: &str) -> ProjectionError {
    ProjectionError::config(format!("unrecognized param: {}", name))
}

fn whole_days(name: &str, delta: Real) -> Result<Duration> {
    if delta.fract() != 0.0 || !delta.is_finite() {
        return Err(ProjectionError::config(format!(
            "{} is a date and can only change by whole days, got {}",
            name, delta
        )));
    }
    Ok(Duration::days(delta as i64))
}

named_params! {
    /// Unvalidated parameters, as produced by a parameter store or a user.
    ///
    /// Every field is optional here. ParameterVector::resolve() checks that
    /// required values are present, fills defaults and draws the randomized
    /// ones.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
    pub struct RawParams {
        numbers: {
            /// R before any intervention.
            initial_r_0,
            /// R under lockdown.
            lockdown_r_0,
            /// Steepness of the transition into lockdown.
            rate_of_inflection,
            /// Multiplicative change of lockdown R after weeks of lockdown.
            lockdown_fatigue,
            /// Imported infections per day at the start of the simulation.
            daily_imports,
            /// Initial infection fatality ratio.
            mortality_rate,
            /// Extra days added to the reopen date.
            reopen_shift_days,
            /// Target R after reopening.
            reopen_r,
            /// Multiplier applied to lockdown R to obtain the reopening R.
            reopen_r_mult,
            /// Steepness of the reopening transition.
            reopen_inflection,
            /// R that reopening settles to.
            post_reopen_equilibrium_r,
            /// Daily seasonal multiplier applied from the fall onwards.
            fall_r_multiplier,
            /// Daily decay of R once reopening settles.
            post_reopening_r_decay,
            /// Days with a constant number of imports.
            beginning_days_flat,
            /// Days before the end of the simulation without imports.
            end_days_offset,
        }
        dates: {
            /// Midpoint of the transition into lockdown.
            inflection_day,
            /// Date when restrictions are lifted.
            reopen_date,
        }
    }
}

impl RawParams {
    /// Create params from (name, value) pairs. Unknown names are an error.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ParamValue)>,
        S: AsRef<str>,
    {
        let mut params = RawParams::default();
        for (name, value) in pairs {
            params.set_param(name.as_ref(), value)?;
        }
        Ok(params)
    }

    /// Parse params from TOML source.
    pub fn from_toml(src: &str) -> Result<Self> {
        toml::from_str(src).map_err(|e| ProjectionError::config(format!("invalid params: {}", e)))
    }

    /// Reference parameter set for the US, starting 2020-02-01.
    pub fn default_us() -> Self {
        let date = |y, m, d| Date::from_ymd_opt(y, m, d);
        RawParams {
            initial_r_0: Some(2.24),
            lockdown_r_0: Some(0.9),
            inflection_day: date(2020, 3, 18),
            rate_of_inflection: Some(0.25),
            lockdown_fatigue: Some(1.0),
            daily_imports: Some(500.0),
            mortality_rate: Some(0.01),
            reopen_date: date(2020, 5, 20),
            reopen_shift_days: Some(0.0),
            reopen_r: Some(1.2),
            reopen_inflection: Some(0.3),
            post_reopen_equilibrium_r: Some(1.0),
            fall_r_multiplier: Some(1.001),
            ..Default::default()
        }
    }
}
