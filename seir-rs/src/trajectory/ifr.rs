use crate::{
    params::{CountryClass, ModelConstants, ParameterVector},
    prelude::{DayIdx, Real},
};

/// Multiplicative decay of mortality on a given day.
///
/// Mortality starts declining after a fixed number of days (earlier for
/// early-impacted countries) as treatment improves. Where care improves faster
/// after reopening, the days following reopen_idx + days_before_death decay at
/// the stronger reopening rate.
pub fn mortality_multiplier(day_idx: usize, class: &CountryClass, reopen_idx: DayIdx, constants: &ModelConstants) -> Real {
    let m = &constants.mortality;
    let decay_start = if class.early_impacted {
        m.early_decay_start_day
    } else {
        m.late_decay_start_day
    };
    let days_with_mult = day_idx.saturating_sub(decay_start) as Real;

    let mult = if class.accelerated_reopen_care {
        let since_reopen = day_idx as DayIdx - (reopen_idx + constants.days_before_death as DayIdx);
        let days_after_reopening = since_reopen.clamp(0, m.max_days_accelerated_decay as DayIdx) as Real;
        let days_else = (days_with_mult - days_after_reopening).max(0.0);
        m.mortality_multiplier.powf(days_else) * m.reopen_mortality_multiplier.powf(days_after_reopening)
    } else {
        m.mortality_multiplier.powf(days_with_mult)
    };
    mult.max(m.min_mortality_multiplier)
}

/// Infection fatality ratio for each day, floored at the minimum IFR.
pub fn build_ifr(
    params: &ParameterVector,
    class: &CountryClass,
    reopen_idx: DayIdx,
    n_days: usize,
    constants: &ModelConstants,
) -> Vec<Real> {
    let min_ifr = constants.mortality.min_ifr;
    (0..n_days)
        .map(|i| {
            let mult = mortality_multiplier(i, class, reopen_idx, constants);
            (params.mortality_rate() * mult).max(min_ifr)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        params::RawParams,
        region::{RegionIdentity, SimulationWindow},
    };
    use assert_approx_eq::assert_approx_eq;

    fn params(mortality_rate: Real) -> ParameterVector {
        let mut raw = RawParams::default_us();
        raw.mortality_rate = Some(mortality_rate);
        let window = SimulationWindow::new(
            "2020-02-01".parse().unwrap(),
            None,
            "2021-02-01".parse().unwrap(),
        )
        .unwrap();
        ParameterVector::resolve_fixed(&raw, &RegionIdentity::for_country("US"), &window, &ModelConstants::default())
            .unwrap()
    }

    #[test]
    fn constant_until_decay_starts() {
        let c = ModelConstants::default();
        let italy = CountryClass::of("Italy");
        assert!(italy.early_impacted);
        assert_eq!(mortality_multiplier(30, &italy, 500, &c), 1.0);
        assert_approx_eq!(mortality_multiplier(40, &italy, 500, &c), 0.995f64.powi(10));

        let brazil = CountryClass::of("Brazil");
        assert_eq!(mortality_multiplier(120, &brazil, 500, &c), 1.0);
        assert_approx_eq!(mortality_multiplier(130, &brazil, 500, &c), 0.995f64.powi(10));
    }

    #[test]
    fn reopening_accelerates_decay_for_us() {
        let c = ModelConstants::default();
        let us = CountryClass::of("US");
        // reopen at 100, accelerated decay from day 122 for at most 30 days
        assert_approx_eq!(
            mortality_multiplier(132, &us, 100, &c),
            0.995f64.powi(92) * 0.98f64.powi(10)
        );
        assert_approx_eq!(
            mortality_multiplier(170, &us, 100, &c),
            0.995f64.powi(110) * 0.98f64.powi(30)
        );
    }

    #[test]
    fn multiplier_and_ifr_are_floored() {
        let c = ModelConstants::default();
        let brazil = CountryClass::of("Brazil");
        assert_eq!(mortality_multiplier(10_000, &brazil, 0, &c), 0.3);

        let ifr = build_ifr(&params(0.01), &CountryClass::of("US"), 124, 367, &c);
        assert_eq!(ifr.len(), 367);
        assert_eq!(ifr[0], 0.01);
        assert!(ifr.iter().all(|&x| (0.0025..=0.01).contains(&x)));
        assert!(ifr.windows(2).all(|w| w[1] <= w[0]));

        let ifr = build_ifr(&params(0.001), &CountryClass::of("US"), 124, 367, &c);
        assert!(ifr.iter().all(|&x| x == 0.0025));
    }
}
