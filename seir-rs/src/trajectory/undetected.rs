use crate::{
    params::{CountryClass, UndetectedConstants},
    prelude::Real,
};

/// Fraction of true deaths that go unreported on each day.
///
/// Starts at the initial ratio and declines linearly to a floor as testing
/// ramps up. Early-impacted countries reach a lower floor sooner. All zeros
/// when the adjustment is disabled.
pub fn build_undetected(class: &CountryClass, n_days: usize, constants: &UndetectedConstants) -> Vec<Real> {
    if !constants.enabled {
        return vec![0.0; n_days];
    }
    let (min_ratio, days_until_min) = if class.early_impacted {
        (constants.early_min_ratio, constants.early_days_until_min)
    } else {
        (constants.late_min_ratio, constants.late_days_until_min)
    };
    let step = (constants.initial_ratio - min_ratio) / days_until_min.max(1) as Real;
    (0..n_days)
        .map(|i| (constants.initial_ratio - step * i as Real).max(min_ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn declines_to_floor() {
        let c = UndetectedConstants::default();
        let ratios = build_undetected(&CountryClass::of("Italy"), 100, &c);
        assert_eq!(ratios[0], 1.0);
        assert_approx_eq!(ratios[45], 0.05);
        assert_eq!(ratios[99], 0.05);
        assert!(ratios.windows(2).all(|w| w[1] <= w[0]));

        let ratios = build_undetected(&CountryClass::of("Brazil"), 200, &c);
        assert_approx_eq!(ratios[60], 1.0 - 0.9 / 2.0);
        assert_approx_eq!(ratios[120], 0.1);
        assert_eq!(ratios[199], 0.1);
    }

    #[test]
    fn disabled_means_all_detected() {
        let c = UndetectedConstants {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(build_undetected(&CountryClass::of("US"), 10, &c), vec![0.0; 10]);
    }
}
