use crate::{
    ensure_config,
    error::Result,
    params::{CountryClass, ImportConstants, ParameterVector},
    prelude::Real,
};
use getset::{CopyGetters, Getters};

/// Daily imported infections.
///
/// Imports stay at DAILY_IMPORTS for the first days, then decline linearly
/// and reach zero end_days_offset days before the end of the window. Unless
/// the country suppressed imports or the offset was set explicitly, imports
/// never drop below a small floor.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ImportSchedule {
    #[getset(get = "pub")]
    values: Vec<Real>,
    #[getset(get_copy = "pub")]
    beginning_days_flat: usize,
    #[getset(get_copy = "pub")]
    end_days_offset: usize,
}

impl ImportSchedule {
    pub fn new(
        params: &ParameterVector,
        class: &CountryClass,
        n_days: usize,
        constants: &ImportConstants,
    ) -> Result<Self> {
        let base = params.daily_imports();
        let flat = params.beginning_days_flat();
        let end_days_offset = params
            .end_days_offset()
            .unwrap_or_else(|| n_days - n_days.min(constants.days_with_imports));
        ensure_config!(
            flat + end_days_offset <= n_days,
            "BEGINNING_DAYS_FLAT ({}) + END_DAYS_OFFSET ({}) exceeds the {} simulated days",
            flat,
            end_days_offset,
            n_days
        );

        let floor = if class.suppresses_imports || params.end_days_offset().is_some() {
            0.0
        } else {
            constants
                .min_daily_imports
                .min(constants.min_daily_imports_fraction * base)
        };
        let declining_days = (n_days - flat - end_days_offset + 1) as Real;
        let values = (0..n_days)
            .map(|i| {
                let elapsed = (i + 1).saturating_sub(flat) as Real;
                let imports = base * (1.0 - (elapsed / declining_days).min(1.0));
                imports.max(floor)
            })
            .collect();

        Ok(ImportSchedule {
            values,
            beginning_days_flat: flat,
            end_days_offset,
        })
    }

    /// Imports on day i, zero past the end of the schedule.
    pub fn at(&self, i: usize) -> Real {
        self.values.get(i).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> Real {
        self.values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        params::{ModelConstants, RawParams},
        prelude::Date,
        region::{RegionIdentity, SimulationWindow},
    };
    use assert_approx_eq::assert_approx_eq;

    fn schedule(country: &str, end_days_offset: Option<Real>, n_days: i64) -> Result<ImportSchedule> {
        let first: Date = "2020-02-01".parse().unwrap();
        let window = SimulationWindow::new(first, None, first + chrono::Duration::days(n_days - 1)).unwrap();
        let identity = RegionIdentity::for_country(country);
        let mut raw = RawParams::default_us();
        raw.daily_imports = Some(500.0);
        raw.end_days_offset = end_days_offset;
        let constants = ModelConstants::default();
        let params = ParameterVector::resolve_fixed(&raw, &identity, &window, &constants)?;
        ImportSchedule::new(&params, &CountryClass::of(country), window.n_days(), &constants.imports)
    }

    #[test]
    fn flat_then_declining_with_floor() {
        let s = schedule("US", None, 250).unwrap();
        assert_eq!(s.end_days_offset(), 150);
        assert_eq!(s.values().len(), 250);
        assert!(s.values()[..10].iter().all(|&x| x == 500.0));
        assert_approx_eq!(s.at(10), 500.0 * (1.0 - 1.0 / 91.0));
        assert!(s.values().windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(s.at(200), 10.0);
        assert_eq!(s.at(1000), 0.0);
    }

    #[test]
    fn suppressing_countries_reach_zero() {
        let s = schedule("South Korea", None, 250).unwrap();
        assert_eq!(s.at(100), 0.0);
        assert_eq!(s.at(249), 0.0);
        assert!(s.at(99) > 0.0);
    }

    #[test]
    fn explicit_end_offset_disables_floor() {
        let s = schedule("US", Some(50.0), 250).unwrap();
        assert_eq!(s.end_days_offset(), 50);
        assert!(s.at(199) > 0.0);
        assert_eq!(s.at(200), 0.0);
    }

    #[test]
    fn offsets_must_fit_window() {
        assert!(matches!(
            schedule("US", Some(245.0), 250),
            Err(crate::error::ProjectionError::Configuration(_))
        ));
    }
}
