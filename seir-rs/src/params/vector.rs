use super::{
    constants::{ModelConstants, TriangularRange},
    countries::CountryClass,
    raw::RawParams,
};
use crate::{
    ensure_config,
    error::{ProjectionError, Result},
    prelude::{Date, Real},
    region::{RegionIdentity, SimulationWindow},
};
use getset::CopyGetters;
use log::debug;
use rand::{rngs::SmallRng, Rng};
use rand_distr::{Distribution, Triangular};
use serde::Serialize;

/// How the reopening R is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ReopenTarget {
    /// An explicit reopening R.
    Absolute(Real),
    /// A multiplier over the lockdown R, amplified when lockdown R is low.
    Multiplier(Real),
}

/// A fully resolved and validated parameter vector.
///
/// Values never change after construction and no randomness is involved
/// downstream, so projections built from the same vector are identical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ParameterVector {
    initial_r_0: Real,
    lockdown_r_0: Real,
    inflection_day: Date,
    rate_of_inflection: Real,
    lockdown_fatigue: Real,
    daily_imports: Real,
    mortality_rate: Real,
    reopen_date: Date,
    reopen_shift_days: i64,
    reopen_target: ReopenTarget,
    reopen_inflection: Real,
    post_reopen_equilibrium_r: Option<Real>,
    fall_r_multiplier: Real,
    post_reopening_r_decay: Real,
    beginning_days_flat: usize,
    end_days_offset: Option<usize>,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| ProjectionError::config(format!("missing required param {}", name)))
}

fn whole_number(value: Real, name: &str) -> Result<i64> {
    ensure_config!(
        value.is_finite() && value.fract() == 0.0,
        "{} must be a whole number, got {}",
        name,
        value
    );
    Ok(value as i64)
}

fn day_count(value: Real, name: &str, n_days: i64) -> Result<usize> {
    let n = whole_number(value, name)?;
    ensure_config!(n >= 0, "{} must be non-negative, got {}", name, value);
    ensure_config!(n <= n_days, "{} must not exceed the {} simulated days, got {}", name, n_days, value);
    Ok(n as usize)
}

fn check_r(value: Real, name: &str) -> Result<Real> {
    ensure_config!(
        0.0 < value && value <= 10.0,
        "{} must be in (0, 10], got {}",
        name,
        value
    );
    Ok(value)
}

/// Draw from a triangular distribution, or return its mode when no random
/// source is given.
fn draw<R: Rng>(range: TriangularRange, rng: &mut Option<&mut R>) -> Result<Real> {
    match rng {
        Some(rng) => {
            let distrib = Triangular::new(range.low, range.high, range.mode)
                .map_err(|e| ProjectionError::config(format!("bad range {:?}: {}", range, e)))?;
            Ok(distrib.sample(&mut **rng))
        }
        None => Ok(range.mode),
    }
}

impl ParameterVector {
    /// Validate raw params and resolve them into a parameter vector.
    ///
    /// Parameters that are not given and carry uncertainty
    /// (POST_REOPENING_R_DECAY, FALL_R_MULTIPLIER) are drawn from rng exactly
    /// once, in this order. With no rng, the mode of each distribution is
    /// used.
    pub fn resolve<R: Rng>(
        raw: &RawParams,
        identity: &RegionIdentity,
        window: &SimulationWindow,
        constants: &ModelConstants,
        mut rng: Option<&mut R>,
    ) -> Result<Self> {
        let class = CountryClass::of_region(identity);
        let first_date = window.first_date();

        let initial_r_0 = check_r(required(raw.initial_r_0, "INITIAL_R_0")?, "INITIAL_R_0")?;
        let lockdown_r_0 = check_r(required(raw.lockdown_r_0, "LOCKDOWN_R_0")?, "LOCKDOWN_R_0")?;
        let inflection_day = required(raw.inflection_day, "INFLECTION_DAY")?;
        let reopen_date = required(raw.reopen_date, "REOPEN_DATE")?;
        for (name, date) in [("INFLECTION_DAY", inflection_day), ("REOPEN_DATE", reopen_date)] {
            ensure_config!(
                date >= first_date,
                "{} {} must not be before first date {}",
                name,
                date,
                first_date
            );
        }
        ensure_config!(
            reopen_date > inflection_day,
            "reopen date {} must be after inflection day {}",
            reopen_date,
            inflection_day
        );

        let rate_of_inflection = required(raw.rate_of_inflection, "RATE_OF_INFLECTION")?;
        ensure_config!(
            0.0 < rate_of_inflection && rate_of_inflection <= 1.0,
            "RATE_OF_INFLECTION must be in (0, 1], got {}",
            rate_of_inflection
        );

        let lockdown_fatigue = raw.lockdown_fatigue.unwrap_or(1.0);
        ensure_config!(
            (0.5..=1.5).contains(&lockdown_fatigue),
            "LOCKDOWN_FATIGUE must be in [0.5, 1.5], got {}",
            lockdown_fatigue
        );

        let daily_imports = required(raw.daily_imports, "DAILY_IMPORTS")?;
        ensure_config!(
            daily_imports >= 0.0 && daily_imports.is_finite(),
            "DAILY_IMPORTS must be non-negative, got {}",
            daily_imports
        );

        let mortality_rate = required(raw.mortality_rate, "MORTALITY_RATE")?;
        ensure_config!(
            0.0 < mortality_rate && mortality_rate < 0.2,
            "MORTALITY_RATE must be in (0, 0.2), got {}",
            mortality_rate
        );

        let n_days = window.n_days() as i64;
        let reopen_shift_days = whole_number(raw.reopen_shift_days.unwrap_or(0.0), "REOPEN_SHIFT_DAYS")?;
        ensure_config!(
            reopen_shift_days.unsigned_abs() <= n_days as u64,
            "REOPEN_SHIFT_DAYS must be within the {} simulated days, got {}",
            n_days,
            reopen_shift_days
        );

        let reopen_target = match (raw.reopen_r, raw.reopen_r_mult) {
            (Some(r), None) => ReopenTarget::Absolute(check_r(r, "REOPEN_R")?),
            (None, Some(mult)) => {
                ensure_config!(
                    (1.0..=10.0).contains(&mult),
                    "REOPEN_R_MULT must be in [1, 10], got {}",
                    mult
                );
                ReopenTarget::Multiplier(mult)
            }
            (Some(_), Some(_)) => {
                return Err(ProjectionError::config(
                    "REOPEN_R and REOPEN_R_MULT are mutually exclusive",
                ))
            }
            (None, None) => {
                return Err(ProjectionError::config(
                    "missing required param REOPEN_R (or REOPEN_R_MULT)",
                ))
            }
        };

        let reopen_inflection = raw
            .reopen_inflection
            .unwrap_or(constants.transmission.default_reopen_inflection);
        ensure_config!(
            0.0 < reopen_inflection && reopen_inflection <= 1.0,
            "REOPEN_INFLECTION must be in (0, 1], got {}",
            reopen_inflection
        );

        let post_reopen_equilibrium_r = match raw.post_reopen_equilibrium_r {
            Some(r) => Some(check_r(r, "POST_REOPEN_EQUILIBRIUM_R")?),
            None => None,
        };

        let beginning_days_flat = match raw.beginning_days_flat {
            Some(x) => day_count(x, "BEGINNING_DAYS_FLAT", n_days)?,
            None => constants.imports.beginning_days_flat,
        };
        let end_days_offset = match raw.end_days_offset {
            Some(x) => Some(day_count(x, "END_DAYS_OFFSET", n_days)?),
            None => None,
        };

        // Randomized params
        let post_reopening_r_decay = match raw.post_reopening_r_decay {
            Some(x) => x,
            None => draw(Self::post_reopening_r_decay_range(&class, constants), &mut rng)?,
        };
        ensure_config!(
            0.0 < post_reopening_r_decay && post_reopening_r_decay <= 1.0,
            "POST_REOPENING_R_DECAY must be in (0, 1], got {}",
            post_reopening_r_decay
        );

        let fall_r_multiplier = if !class.has_us_seasonality() {
            1.0
        } else {
            match raw.fall_r_multiplier {
                Some(x) => x,
                None => draw(constants.randomization.fall_r_multiplier, &mut rng)?,
            }
        };
        ensure_config!(
            fall_r_multiplier > 0.0 && fall_r_multiplier.is_finite(),
            "FALL_R_MULTIPLIER must be positive, got {}",
            fall_r_multiplier
        );

        debug!(
            "resolved params for {}: post reopening R decay = {:.5}, fall R multiplier = {:.5}",
            identity, post_reopening_r_decay, fall_r_multiplier
        );

        Ok(ParameterVector {
            initial_r_0,
            lockdown_r_0,
            inflection_day,
            rate_of_inflection,
            lockdown_fatigue,
            daily_imports,
            mortality_rate,
            reopen_date,
            reopen_shift_days,
            reopen_target,
            reopen_inflection,
            post_reopen_equilibrium_r,
            fall_r_multiplier,
            post_reopening_r_decay,
            beginning_days_flat,
            end_days_offset,
        })
    }

    /// Resolve without a random source: uncertain params take their modes.
    pub fn resolve_fixed(
        raw: &RawParams,
        identity: &RegionIdentity,
        window: &SimulationWindow,
        constants: &ModelConstants,
    ) -> Result<Self> {
        Self::resolve(raw, identity, window, constants, None::<&mut SmallRng>)
    }

    fn post_reopening_r_decay_range(class: &CountryClass, constants: &ModelConstants) -> TriangularRange {
        let r = &constants.randomization;
        if let Some(range) = r.custom_post_reopening_r_decay {
            range
        } else if class.is_us {
            r.post_reopening_r_decay_us
        } else if class.early_impacted {
            r.post_reopening_r_decay_early
        } else if class.has_us_seasonality() {
            r.post_reopening_r_decay_seasonal
        } else {
            r.post_reopening_r_decay_other
        }
    }

    /// Lockdown R after fatigue has fully set in.
    pub fn fatigued_lockdown_r(&self) -> Real {
        self.lockdown_r_0 * self.lockdown_fatigue
    }

    /// Raw params equivalent to this vector, with every drawn value made
    /// explicit.
    pub fn to_raw(&self) -> RawParams {
        let (reopen_r, reopen_r_mult) = match self.reopen_target {
            ReopenTarget::Absolute(r) => (Some(r), None),
            ReopenTarget::Multiplier(m) => (None, Some(m)),
        };
        RawParams {
            initial_r_0: Some(self.initial_r_0),
            lockdown_r_0: Some(self.lockdown_r_0),
            inflection_day: Some(self.inflection_day),
            rate_of_inflection: Some(self.rate_of_inflection),
            lockdown_fatigue: Some(self.lockdown_fatigue),
            daily_imports: Some(self.daily_imports),
            mortality_rate: Some(self.mortality_rate),
            reopen_date: Some(self.reopen_date),
            reopen_shift_days: Some(self.reopen_shift_days as Real),
            reopen_r,
            reopen_r_mult,
            reopen_inflection: Some(self.reopen_inflection),
            post_reopen_equilibrium_r: self.post_reopen_equilibrium_r,
            fall_r_multiplier: Some(self.fall_r_multiplier),
            post_reopening_r_decay: Some(self.post_reopening_r_decay),
            beginning_days_flat: Some(self.beginning_days_flat as Real),
            end_days_offset: self.end_days_offset.map(|x| x as Real),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::ParamValue, utils::seeded_rng};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn window() -> SimulationWindow {
        SimulationWindow::new(date("2020-02-01"), None, date("2020-10-01")).unwrap()
    }

    fn resolve(raw: &RawParams) -> Result<ParameterVector> {
        ParameterVector::resolve_fixed(
            raw,
            &RegionIdentity::for_country("US"),
            &window(),
            &ModelConstants::default(),
        )
    }

    #[test]
    fn resolves_reference_params() {
        let p = resolve(&RawParams::default_us()).unwrap();
        assert_eq!(p.initial_r_0(), 2.24);
        assert_eq!(p.reopen_target(), ReopenTarget::Absolute(1.2));
        assert_eq!(p.fall_r_multiplier(), 1.001);
        assert_eq!(p.post_reopening_r_decay(), 0.996);
        assert_eq!(p.beginning_days_flat(), 10);
        assert_eq!(p.end_days_offset(), None);
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let cases: Vec<(&str, ParamValue)> = vec![
            ("INITIAL_R_0", 0.0.into()),
            ("LOCKDOWN_R_0", 11.0.into()),
            ("RATE_OF_INFLECTION", 1.5.into()),
            ("MORTALITY_RATE", 0.2.into()),
            ("LOCKDOWN_FATIGUE", 1.6.into()),
            ("DAILY_IMPORTS", (-1.0).into()),
            ("REOPEN_DATE", date("2020-03-01").into()),
            ("INFLECTION_DAY", date("2020-01-01").into()),
            ("REOPEN_SHIFT_DAYS", 1.5.into()),
            ("END_DAYS_OFFSET", (-3.0).into()),
            ("END_DAYS_OFFSET", 1e30.into()),
            ("REOPEN_SHIFT_DAYS", 1e30.into()),
            ("REOPEN_SHIFT_DAYS", (-300.0).into()),
            ("REOPEN_SHIFT_DAYS", (-1e30).into()),
        ];
        for (name, value) in cases {
            let mut raw = RawParams::default_us();
            raw.set_param(name, value).unwrap();
            assert!(
                matches!(resolve(&raw), Err(ProjectionError::Configuration(_))),
                "{} = {} should be rejected",
                name,
                value
            );
        }
    }

    #[test]
    fn reopen_shift_within_window_is_accepted() {
        let mut raw = RawParams::default_us();
        raw.reopen_shift_days = Some(-20.0);
        assert_eq!(resolve(&raw).unwrap().reopen_shift_days(), -20);
        raw.reopen_shift_days = Some(window().n_days() as Real);
        assert!(resolve(&raw).is_ok());
    }

    #[test]
    fn requires_exactly_one_reopen_target() {
        let mut raw = RawParams::default_us();
        raw.reopen_r_mult = Some(1.1);
        assert!(resolve(&raw).is_err());
        raw.reopen_r = None;
        assert_eq!(resolve(&raw).unwrap().reopen_target(), ReopenTarget::Multiplier(1.1));
        raw.reopen_r_mult = None;
        assert!(resolve(&raw).is_err());
    }

    #[test]
    fn missing_required_param_is_reported() {
        let mut raw = RawParams::default_us();
        raw.mortality_rate = None;
        let err = resolve(&raw).unwrap_err();
        assert!(err.to_string().contains("MORTALITY_RATE"));
    }

    #[test]
    fn draws_are_reproducible_and_in_range() {
        let mut raw = RawParams::default_us();
        raw.fall_r_multiplier = None;
        let identity = RegionIdentity::for_country("US");
        let constants = ModelConstants::default();
        let run = |seed| {
            let mut rng = seeded_rng(seed);
            ParameterVector::resolve(&raw, &identity, &window(), &constants, Some(&mut rng)).unwrap()
        };
        let a = run(7);
        let b = run(7);
        assert_eq!(a, b);
        assert!((0.993..=0.999).contains(&a.post_reopening_r_decay()));
        assert!((0.998..=1.005).contains(&a.fall_r_multiplier()));
    }

    #[test]
    fn non_seasonal_countries_have_no_fall_uptick() {
        let p = ParameterVector::resolve_fixed(
            &RawParams::default_us(),
            &RegionIdentity::for_country("Brazil"),
            &window(),
            &ModelConstants::default(),
        )
        .unwrap();
        assert_eq!(p.fall_r_multiplier(), 1.0);
        assert_eq!(p.post_reopening_r_decay(), 0.998);
    }

    #[test]
    fn to_raw_resolves_to_same_vector() {
        let p = resolve(&RawParams::default_us()).unwrap();
        assert_eq!(resolve(&p.to_raw()).unwrap(), p);
    }
}
