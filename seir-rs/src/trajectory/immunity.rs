use super::SigmoidTransition;
use crate::{params::ImmunityConstants, prelude::Real};

/// Exponent controlling how strongly the cumulative fraction of infected
/// population suppresses transmission.
///
/// US states and counties mix more locally and use a smaller constant. Large
/// countries saturate local sub-populations first, so the effect grows with
/// population through a sigmoid centered at the population threshold.
pub fn immunity_multiplier(
    population: u64,
    country: &str,
    is_subregion: bool,
    constants: &ImmunityConstants,
) -> Real {
    let mult = if country == "US" {
        if is_subregion {
            constants.us_subregion_multiplier
        } else {
            constants.multiplier
        }
    } else if is_subregion {
        constants.multiplier
    } else {
        let millions = population as Real / 1e6;
        SigmoidTransition::unchecked(
            constants.large_population_threshold_millions,
            constants.large_population_rate,
            constants.multiplier,
            constants.large_population_multiplier,
        )
        .value(millions)
    };
    mult.clamp(0.0, 2.0)
}
