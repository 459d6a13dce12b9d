use crate::{
    ensure_config, ensure_domain,
    error::Result,
    params::ModelConstants,
    prelude::Real,
};
use getset::Getters;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for the sum of a normalized kernel.
pub const KERNEL_SUM_TOLERANCE: Real = 1e-9;

/// Non-negative weights that sum to one. The first entry is the shortest
/// delay.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct ConvolutionKernel {
    weights: Array1<Real>,
}

impl ConvolutionKernel {
    /// Create kernel from un-normalized weights.
    pub fn new(weights: &[Real]) -> Result<Self> {
        ensure_domain!(!weights.is_empty(), "empty convolution kernel");
        ensure_domain!(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "kernel weights must be finite and non-negative: {:?}",
            weights
        );
        let total: Real = weights.iter().sum();
        ensure_domain!(total > 0.0, "kernel weights sum to zero");
        Ok(ConvolutionKernel {
            weights: Array1::from(weights.to_vec()) / total,
        })
    }

    /// Create kernel from weights that are already normalized.
    pub fn from_normalized(weights: &[Real]) -> Result<Self> {
        let total: Real = weights.iter().sum();
        ensure_domain!(
            (total - 1.0).abs() <= KERNEL_SUM_TOLERANCE,
            "kernel weights sum to {}, expected 1",
            total
        );
        Self::new(weights)
    }

    /// Front-loaded kernel with weights decaying geometrically.
    pub fn geometric(len: usize, decay: Real) -> Result<Self> {
        let weights: Vec<Real> = (0..len).map(|i| decay.powi(i as i32)).collect();
        Self::new(&weights)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Index of the central weight. Only meaningful for odd lengths.
    pub fn center(&self) -> usize {
        self.len() / 2
    }

    /// Weights ordered from the longest delay to the shortest, aligned with a
    /// slice of a series that ends at the shortest delay.
    pub fn reversed(&self) -> Array1<Real> {
        self.weights.slice(s![..;-1]).to_owned()
    }

    /// Reversed weights with infectiousness reduced by quarantine.
    ///
    /// Quarantined individuals stop transmitting once symptomatic, so the
    /// reduction hits the later days of the infectious period. Entries before
    /// the tier's reduction index are scaled by (1 - q) and the entry at the
    /// index by 0.5 + 0.5 * (1 - q). The result is no longer normalized.
    pub fn reversed_with_quarantine(&self, quarantine: &Quarantine) -> Array1<Real> {
        let mut reversed = self.reversed();
        let remaining = 1.0 - quarantine.fraction();
        let idx = quarantine.tier().reduction_idx().min(reversed.len());
        reversed.slice_mut(s![..idx]).mapv_inplace(|w| w * remaining);
        if let Some(w) = reversed.get_mut(idx) {
            *w *= 0.5 + 0.5 * remaining;
        }
        reversed
    }
}

/// The three kernels used by the simulation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernels {
    /// Relative infectiousness on each day after the incubation period.
    pub infectious: ConvolutionKernel,
    /// Spread of deaths around the mean infection-to-death delay. Odd length.
    pub death_delay: ConvolutionKernel,
    /// Delay between a death and its report.
    pub report_lag: ConvolutionKernel,
}

impl Kernels {
    pub fn from_constants(constants: &ModelConstants) -> Result<Self> {
        let death_delay = ConvolutionKernel::new(&constants.deaths_days)?;
        ensure_domain!(
            death_delay.len() % 2 == 1,
            "death kernel must have odd length, got {}",
            death_delay.len()
        );
        Ok(Kernels {
            infectious: ConvolutionKernel::new(&constants.infectious_days)?,
            death_delay,
            report_lag: ConvolutionKernel::geometric(constants.report_lag_days, constants.report_lag_decay)?,
        })
    }
}

/// Effectiveness of quarantine, i.e. how early in the infectious period
/// transmission stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineTier {
    /// Quarantine fraction of 0.025.
    Minimal,
    /// Quarantine fraction of 0.1.
    Low,
    /// Quarantine fraction of 0.25.
    Moderate,
    /// Quarantine fraction of 0.5.
    High,
}

impl QuarantineTier {
    pub const ALL: [QuarantineTier; 4] = [Self::Minimal, Self::Low, Self::Moderate, Self::High];

    /// Nominal effectiveness value of the tier.
    pub fn value(self) -> Real {
        match self {
            Self::Minimal => 0.025,
            Self::Low => 0.1,
            Self::Moderate => 0.25,
            Self::High => 0.5,
        }
    }

    pub fn reduction_idx(self) -> usize {
        match self {
            Self::Minimal => 0,
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
        }
    }

    /// Tier with the given nominal effectiveness.
    pub fn from_value(value: Real) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tier| (tier.value() - value).abs() < 1e-12)
            .ok_or_else(|| {
                crate::error::ProjectionError::config(format!(
                    "quarantine effectiveness must be one of 0.025, 0.1, 0.25, 0.5, got {}",
                    value
                ))
            })
    }
}

/// Fraction of infected people that quarantine, and how effectively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quarantine {
    fraction: Real,
    tier: QuarantineTier,
}

impl Quarantine {
    pub fn new(fraction: Real, tier: QuarantineTier) -> Result<Self> {
        ensure_config!(
            (0.0..=1.0).contains(&fraction),
            "quarantine fraction must be in [0, 1], got {}",
            fraction
        );
        Ok(Quarantine { fraction, tier })
    }

    pub fn fraction(&self) -> Real {
        self.fraction
    }

    pub fn tier(&self) -> QuarantineTier {
        self.tier
    }
}
