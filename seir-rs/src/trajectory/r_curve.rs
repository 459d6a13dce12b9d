use super::SigmoidTransition;
use crate::{
    error::{ProjectionError, Result},
    params::{CountryClass, ModelConstants, ParameterVector, PostReopenModel, ReopenTarget, TransmissionConstants},
    prelude::{DayIdx, Real},
    region::{RegionIdentity, SimulationWindow},
};
use getset::{CopyGetters, Getters};
use log::debug;

/// Reproduction number for each day of a simulation window.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct RCurve {
    #[getset(get = "pub")]
    values: Vec<Real>,
    /// Day index at which the reopening transition is centered.
    #[getset(get_copy = "pub")]
    reopen_idx: DayIdx,
}

impl RCurve {
    pub fn into_values(self) -> Vec<Real> {
        self.values
    }
}

/// Key day indices of the R trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeIndices {
    pub inflection_idx: DayIdx,
    pub fatigue_idx: DayIdx,
    pub reopen_idx: DayIdx,
    pub lockdown_reopen_midpoint_idx: DayIdx,
    pub equilibrium_idx: DayIdx,
    pub post_reopen_midpoint_idx: DayIdx,
    pub post_reopening_idx: DayIdx,
    pub fall_start_idx: DayIdx,
}

impl RegimeIndices {
    pub fn new(params: &ParameterVector, window: &SimulationWindow, t: &TransmissionConstants) -> Self {
        let inflection_idx = window.day_idx(params.inflection_day());
        let reopen_idx = window.day_idx(params.reopen_date())
            + params.reopen_shift_days()
            + t.default_reopen_shift_days;
        let equilibrium_shift =
            (2.0 * t.equilibrium_shift_factor / params.reopen_inflection()).round() as DayIdx;
        let equilibrium_idx = reopen_idx + equilibrium_shift;

        // R <= 1 under lockdown takes longer to reopen fully
        let days_until_post_reopening = if params.lockdown_r_0() <= 1.0 {
            t.days_until_post_reopening_low_r
        } else {
            t.days_until_post_reopening
        };

        RegimeIndices {
            inflection_idx,
            fatigue_idx: inflection_idx + t.days_until_lockdown_fatigue,
            reopen_idx,
            lockdown_reopen_midpoint_idx: (inflection_idx + reopen_idx).div_euclid(2),
            equilibrium_idx,
            post_reopen_midpoint_idx: (reopen_idx + equilibrium_idx).div_euclid(2),
            post_reopening_idx: reopen_idx + days_until_post_reopening,
            fall_start_idx: window.day_idx(t.fall_start_date) - t.fall_lead_days,
        }
    }
}

/// Highest R allowed once reopening settles.
///
/// Country-wide values are less variable than regional ones.
pub fn max_post_open_r(identity: &RegionIdentity, class: &CountryClass, t: &TransmissionConstants) -> Real {
    if identity.is_subregion() || class.is_us {
        t.max_post_reopen_r + t.subregion_post_reopen_r_bonus
    } else if class.larger_second_wave {
        t.max_post_reopen_r * t.larger_second_wave_post_reopen_r_factor
    } else {
        t.max_post_reopen_r
    }
}

/// R reached by the reopening transition.
///
/// A multiplier target assumes greater growth when lockdown R was effective:
/// e.g. 1.1 maps R = 1 to 1.1 but R = 0.7 to (2 - 0.7)^0.5 * 1.1 * 0.7.
pub fn reopening_r(params: &ParameterVector, ceiling: Real) -> Real {
    let lockdown_r = params.lockdown_r_0();
    let mut reopen_r = match params.reopen_target() {
        ReopenTarget::Absolute(r) => r,
        ReopenTarget::Multiplier(mult) => {
            let reopen_mult = ((2.0 - lockdown_r).max(0.0).sqrt() * mult).max(1.0);
            reopen_mult * lockdown_r
        }
    };
    if lockdown_r < 1.0 {
        reopen_r = reopen_r.max(lockdown_r);
    }
    ceiling.max(lockdown_r).min(reopen_r)
}

/// Build the reproduction number for every day of the window.
///
/// Lockdown, fatigue, reopening and post-reopening regimes are blended with
/// sigmoids and a seasonal multiplier is applied from the fall onwards. Fails
/// with an instability error if R changes by more than the stability
/// tolerance between two consecutive days after reopening.
pub fn build_r_curve(
    params: &ParameterVector,
    identity: &RegionIdentity,
    window: &SimulationWindow,
    constants: &ModelConstants,
) -> Result<RCurve> {
    let t = &constants.transmission;
    let n = window.n_days();
    let class = CountryClass::of_region(identity);
    let idx = RegimeIndices::new(params, window, t);

    let lockdown_r = params.lockdown_r_0();
    let post_reopening_r = reopening_r(params, max_post_open_r(identity, &class, t));
    let equilibrium_r = params
        .post_reopen_equilibrium_r()
        .map_or(post_reopening_r, |r| r.min(post_reopening_r));
    let reopen_start_r = if t.apply_fatigue {
        params.fatigued_lockdown_r()
    } else {
        lockdown_r
    };

    let sig_lockdown = SigmoidTransition::new(
        idx.inflection_idx as Real,
        params.rate_of_inflection(),
        params.initial_r_0(),
        lockdown_r,
    )?;
    let sig_fatigue = SigmoidTransition::unchecked(
        idx.fatigue_idx as Real,
        t.fatigue_rate,
        0.0,
        params.lockdown_fatigue() - 1.0,
    );
    let sig_reopen = SigmoidTransition::new(
        idx.reopen_idx as Real,
        params.reopen_inflection(),
        reopen_start_r,
        post_reopening_r,
    )?;
    let sig_equilibrium = SigmoidTransition::new(
        idx.equilibrium_idx as Real,
        params.reopen_inflection(),
        post_reopening_r,
        equilibrium_r,
    )?;

    // how much post_reopening_r may drop under geometric decay
    let min_post_reopening_total_decay = t.max_post_reopening_total_decay.min(1.0 / post_reopening_r);

    debug!(
        "R regimes: {:?}, reopening R = {:.3}, equilibrium R = {:.3}",
        idx, post_reopening_r, equilibrium_r
    );

    let mut values = Vec::with_capacity(n);
    values.push(params.initial_r_0());
    for day_idx in 1..n {
        let day = day_idx as DayIdx;
        let x = day_idx as Real;

        let mut r_t = if day < idx.lockdown_reopen_midpoint_idx {
            let fatigue = if t.apply_fatigue { 1.0 + sig_fatigue.value(x) } else { 1.0 };
            sig_lockdown.value(x) * fatigue
        } else {
            match t.post_reopen_model {
                PostReopenModel::Equilibrium => {
                    if day < idx.post_reopen_midpoint_idx {
                        sig_reopen.value(x)
                    } else {
                        sig_equilibrium.value(x)
                    }
                }
                PostReopenModel::GeometricDecay => {
                    let mut total_decay = 1.0;
                    if day > idx.post_reopening_idx {
                        let days = (day - idx.post_reopening_idx) as i32;
                        total_decay = params
                            .post_reopening_r_decay()
                            .powi(days)
                            .max(min_post_reopening_total_decay);
                    }
                    sig_reopen.value(x) * total_decay
                }
            }
        };

        if day > idx.fall_start_idx {
            let days = (day - idx.fall_start_idx) as i32;
            r_t *= params
                .fall_r_multiplier()
                .powi(days)
                .clamp(t.min_fall_r_multiplier, t.max_fall_r_multiplier);
        }

        if day > idx.reopen_idx {
            let previous = values[day_idx - 1];
            if (r_t / previous - 1.0).abs() > t.stability_tolerance {
                return Err(ProjectionError::Instability {
                    day_idx,
                    previous,
                    current: r_t,
                    tolerance: t.stability_tolerance,
                });
            }
        }
        values.push(r_t);
    }

    Ok(RCurve {
        values,
        reopen_idx: idx.reopen_idx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::RawParams, prelude::Date};
    use assert_approx_eq::assert_approx_eq;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn setup(raw: &RawParams, n_days: i64) -> (ParameterVector, RegionIdentity, SimulationWindow) {
        let first = date("2020-02-01");
        let window = SimulationWindow::new(first, None, first + chrono::Duration::days(n_days - 1)).unwrap();
        let identity = RegionIdentity::for_country("US");
        let params =
            ParameterVector::resolve_fixed(raw, &identity, &window, &ModelConstants::default()).unwrap();
        (params, identity, window)
    }

    fn build(raw: &RawParams, n_days: i64, constants: &ModelConstants) -> Result<RCurve> {
        let (params, identity, window) = setup(raw, n_days);
        build_r_curve(&params, &identity, &window, constants)
    }

    #[test]
    fn lockdown_midpoint_scenario() {
        let mut raw = RawParams::default_us();
        raw.inflection_day = Some(date("2020-03-02")); // day 30
        let curve = build(&raw, 270, &ModelConstants::default()).unwrap();
        let r = curve.values();
        assert_eq!(r.len(), 270);
        assert_eq!(r[0], 2.24);
        let midpoint = (2.24 + 0.9) / 2.0;
        assert!((r[30] / midpoint - 1.0).abs() < 0.05, "R[30] = {}", r[30]);
    }

    #[test]
    fn reaches_each_regime() {
        let raw = RawParams::default_us();
        let curve = build(&raw, 244, &ModelConstants::default()).unwrap();
        let r = curve.values();
        // reopen on 2020-05-20 (day 109) plus default shift of 15 days
        assert_eq!(curve.reopen_idx(), 124);
        assert_approx_eq!(r[90], 0.9, 1e-3);
        assert_approx_eq!(r[124], (0.9 + 1.2) / 2.0, 1e-3);
        assert_approx_eq!(r[200], 1.0, 1e-3);
    }

    #[test]
    fn stays_stable_after_reopening() {
        let constants = ModelConstants::default();
        let curve = build(&RawParams::default_us(), 244, &constants).unwrap();
        let r = curve.values();
        for i in (curve.reopen_idx() as usize + 1)..r.len() {
            assert!((r[i] / r[i - 1] - 1.0).abs() <= constants.transmission.stability_tolerance);
        }
    }

    #[test]
    fn abrupt_reopening_is_an_instability() {
        let mut raw = RawParams::default_us();
        raw.lockdown_r_0 = Some(0.5);
        raw.reopen_inflection = Some(1.0);
        let err = build(&raw, 244, &ModelConstants::default()).unwrap_err();
        assert!(matches!(err, ProjectionError::Instability { day_idx: 125, .. }), "{:?}", err);
    }

    #[test]
    fn tolerance_is_configurable() {
        let mut constants = ModelConstants::default();
        constants.transmission.stability_tolerance = 1e-4;
        assert!(matches!(
            build(&RawParams::default_us(), 244, &constants),
            Err(ProjectionError::Instability { .. })
        ));
    }

    #[test]
    fn fatigue_raises_lockdown_r() {
        let mut raw = RawParams::default_us();
        raw.lockdown_fatigue = Some(1.2);
        let with_fatigue = build(&raw, 244, &ModelConstants::default()).unwrap();
        let without = build(&RawParams::default_us(), 244, &ModelConstants::default()).unwrap();
        // fatigue centered 28 days after the inflection (day 46)
        assert_approx_eq!(with_fatigue.values()[74] / without.values()[74], 1.1, 1e-3);
        assert!(with_fatigue.values()[50] < 1.03 * without.values()[50]);

        let mut constants = ModelConstants::default();
        constants.transmission.apply_fatigue = false;
        let ignored = build(&raw, 244, &constants).unwrap();
        assert_approx_eq!(ignored.values()[74], without.values()[74]);
    }

    #[test]
    fn fall_uptick_is_bounded() {
        let mut raw = RawParams::default_us();
        raw.fall_r_multiplier = Some(1.01);
        let long = build(&raw, 500, &ModelConstants::default()).unwrap();
        let flat = {
            let mut raw = raw.clone();
            raw.fall_r_multiplier = Some(1.0);
            build(&raw, 500, &ModelConstants::default()).unwrap()
        };
        // fall starts 30 days before 2020-09-22, i.e. day 204
        assert_approx_eq!(long.values()[204], flat.values()[204]);
        assert_approx_eq!(long.values()[214] / flat.values()[214], 1.01f64.powi(10));
        assert_approx_eq!(long.values()[499] / flat.values()[499], 1.2);
    }

    #[test]
    fn geometric_decay_variant() {
        let mut constants = ModelConstants::default();
        constants.transmission.post_reopen_model = PostReopenModel::GeometricDecay;
        let mut raw = RawParams::default_us();
        raw.post_reopening_r_decay = Some(0.99);
        raw.fall_r_multiplier = Some(1.0);
        let curve = build(&raw, 400, &constants).unwrap();
        let r = curve.values();
        // lockdown R <= 1: decay starts 30 days after reopening
        let start = (curve.reopen_idx() + 30) as usize;
        assert_approx_eq!(r[start + 10] / r[start], 0.99f64.powi(10), 1e-3);
        // floored at min(0.9, 1 / 1.2)
        assert_approx_eq!(r[399], 1.2 * (1.0 / 1.2), 1e-6);
    }

    #[test]
    fn reopening_r_rules() {
        let (params, _, _) = setup(&RawParams::default_us(), 244);
        assert_approx_eq!(reopening_r(&params, 1.26), 1.2);
        assert_approx_eq!(reopening_r(&params, 1.1), 1.1);

        let mut raw = RawParams::default_us();
        raw.reopen_r = None;
        raw.reopen_r_mult = Some(1.1);
        raw.lockdown_r_0 = Some(0.7);
        let (params, _, _) = setup(&raw, 244);
        assert_approx_eq!(reopening_r(&params, 10.0), 1.3f64.sqrt() * 1.1 * 0.7);

        // lockdown R above the ceiling is kept
        let mut raw = RawParams::default_us();
        raw.lockdown_r_0 = Some(1.4);
        raw.reopen_r = Some(1.5);
        let (params, _, _) = setup(&raw, 244);
        assert_approx_eq!(reopening_r(&params, 1.26), 1.4);
    }

    #[test]
    fn ceiling_depends_on_region() {
        let t = TransmissionConstants::default();
        let us = RegionIdentity::for_country("US");
        let state = RegionIdentity::new("US", Some("CA"), None);
        let italy = RegionIdentity::for_country("Italy");
        let israel = RegionIdentity::for_country("Israel");
        let max_r = |id: &RegionIdentity| max_post_open_r(id, &CountryClass::of_region(id), &t);
        assert_approx_eq!(max_r(&us), 1.26);
        assert_approx_eq!(max_r(&state), 1.26);
        assert_approx_eq!(max_r(&italy), 1.16);
        assert_approx_eq!(max_r(&israel), 2.32);
    }
}
