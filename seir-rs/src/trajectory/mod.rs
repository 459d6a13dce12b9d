//! Per-day trajectories derived from a parameter vector.
//!
//! Builders are pure functions of their inputs. The resulting arrays are
//! consumed by the simulation engine and never mutated afterwards.
mod ifr;
mod immunity;
mod r_curve;
mod sigmoid;
mod undetected;

pub use ifr::*;
pub use immunity::*;
pub use r_curve::*;
pub use sigmoid::*;
pub use undetected::*;

use crate::{
    ensure_domain,
    error::Result,
    params::{CountryClass, ModelConstants, ParameterVector},
    prelude::{DayIdx, Real},
    region::{RegionIdentity, RegionMetadata, SimulationWindow},
};
use getset::{CopyGetters, Getters};
use log::debug;
use serde::Serialize;

/// Trajectories consumed by the simulation engine. Every array has one entry
/// per day of the simulation window.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
pub struct DerivedTrajectories {
    #[getset(get = "pub")]
    r: Vec<Real>,
    #[getset(get = "pub")]
    ifr: Vec<Real>,
    #[getset(get = "pub")]
    undetected: Vec<Real>,
    #[getset(get_copy = "pub")]
    immunity_multiplier: Real,
    #[getset(get_copy = "pub")]
    reopen_idx: DayIdx,
}

impl DerivedTrajectories {
    pub fn n_days(&self) -> usize {
        self.r.len()
    }
}

/// Build all trajectories for a region and window.
///
/// Fails if the constants are inconsistent, if the window is too short to
/// contain a full infection-to-death delay, or if the R trajectory is
/// unstable.
pub fn build_trajectories(
    identity: &RegionIdentity,
    metadata: &RegionMetadata,
    window: &SimulationWindow,
    params: &ParameterVector,
    constants: &ModelConstants,
) -> Result<DerivedTrajectories> {
    constants.validate()?;
    let n_days = window.n_days();
    ensure_domain!(
        n_days > constants.death_horizon(),
        "simulation window of {} days is shorter than the infection to death horizon of {} days",
        n_days,
        constants.death_horizon()
    );

    let class = CountryClass::of_region(identity);
    let r_curve = build_r_curve(params, identity, window, constants)?;
    let reopen_idx = r_curve.reopen_idx();
    let ifr = build_ifr(params, &class, reopen_idx, n_days, constants);
    let undetected = build_undetected(&class, n_days, &constants.undetected);
    let immunity_multiplier = immunity_multiplier(
        metadata.population(),
        identity.country(),
        identity.is_subregion(),
        &constants.immunity,
    );
    debug!(
        "trajectories for {}: {} days, reopen index {}, immunity multiplier {:.3}",
        identity, n_days, reopen_idx, immunity_multiplier
    );

    Ok(DerivedTrajectories {
        r: r_curve.into_values(),
        ifr,
        undetected,
        immunity_multiplier,
        reopen_idx,
    })
}
