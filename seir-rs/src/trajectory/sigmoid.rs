use crate::{ensure_config, error::Result, prelude::Real, utils::inv_sigmoid};
use getset::CopyGetters;

/// A smooth transition between two values, centered at an inflection index.
///
/// The value tends to `low` long before the inflection and to `high` long
/// after it. At the inflection the value is exactly the midpoint. Despite the
/// names, `low` may be larger than `high` (e.g. R dropping into lockdown).
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SigmoidTransition {
    inflection: Real,
    rate: Real,
    low: Real,
    high: Real,
}

impl SigmoidTransition {
    /// Create a transition for a primary R value.
    ///
    /// rate must be in (0, 1], low in (0, 10] and high in [0, 10]. Typical
    /// rates are between 0.2 and 0.5.
    pub fn new(inflection: Real, rate: Real, low: Real, high: Real) -> Result<Self> {
        ensure_config!(0.0 < rate && rate <= 1.0, "sigmoid rate must be in (0, 1], got {}", rate);
        ensure_config!(0.0 < low && low <= 10.0, "sigmoid start value must be in (0, 10], got {}", low);
        ensure_config!(
            0.0 <= high && high <= 10.0,
            "sigmoid end value must be in [0, 10], got {}",
            high
        );
        Ok(Self::unchecked(inflection, rate, low, high))
    }

    /// Create a transition without range checks. Used for additive
    /// adjustments, which may be zero or negative.
    pub fn unchecked(inflection: Real, rate: Real, low: Real, high: Real) -> Self {
        SigmoidTransition {
            inflection,
            rate,
            low,
            high,
        }
    }

    pub fn value(&self, x: Real) -> Real {
        inv_sigmoid(x, self.inflection, self.rate, self.low - self.high, self.high)
    }

    /// Value at a day index.
    pub fn at(&self, day_idx: usize) -> Real {
        self.value(day_idx as Real)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn midpoint_and_limits() {
        let s = SigmoidTransition::new(30.0, 0.25, 2.24, 0.9).unwrap();
        assert_approx_eq!(s.at(30), (2.24 + 0.9) / 2.0);
        assert_approx_eq!(s.at(0), 2.24, 1e-3);
        assert_approx_eq!(s.at(200), 0.9, 1e-12);
        assert_approx_eq!(s.value(-1e6), 2.24);
    }

    #[test]
    fn monotone_between_values() {
        let s = SigmoidTransition::new(50.0, 0.3, 0.8, 1.2).unwrap();
        let values: Vec<Real> = (0..100).map(|i| s.at(i)).collect();
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
        assert!(values.iter().all(|&v| (0.8..=1.2).contains(&v)));
    }

    #[test]
    fn validation_is_skippable() {
        assert!(SigmoidTransition::new(10.0, 0.2, 0.0, -0.1).is_err());
        assert!(SigmoidTransition::new(10.0, 0.0, 1.0, 1.0).is_err());
        assert!(SigmoidTransition::new(10.0, 0.5, 1.0, 10.5).is_err());
        let fatigue = SigmoidTransition::unchecked(10.0, 0.2, 0.0, -0.1);
        assert_approx_eq!(fatigue.at(10), -0.05);
    }
}
