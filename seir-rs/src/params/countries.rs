use crate::region::RegionIdentity;
use serde::{Deserialize, Serialize};

pub const EU_COUNTRIES: [&str; 27] = [
    "Austria", "Belgium", "Bulgaria", "Croatia", "Cyprus", "Czechia", "Denmark", "Estonia",
    "Finland", "France", "Germany", "Greece", "Hungary", "Ireland", "Italy", "Latvia",
    "Lithuania", "Luxembourg", "Malta", "Netherlands", "Poland", "Portugal", "Romania",
    "Slovakia", "Slovenia", "Spain", "Sweden",
];
pub const OTHER_EUROPEAN_COUNTRIES: [&str; 8] = [
    "United Kingdom", "Switzerland", "Norway", "Belarus", "Iceland", "Moldova", "Serbia",
    "Ukraine",
];
pub const NON_SEASONAL_COUNTRIES: [&str; 14] = [
    "Indonesia", "Philippines", "India", "Malaysia", "Nigeria", "Bolivia", "Colombia", "Cuba",
    "Dominican Republic", "Ecuador", "Honduras", "Panama", "Peru", "Brazil",
];
pub const SOUTHERN_HEMISPHERE_COUNTRIES: [&str; 4] =
    ["Argentina", "Australia", "Chile", "South Africa"];
pub const EARLY_IMPACTED_NON_EUROPEAN_COUNTRIES: [&str; 7] =
    ["US", "Canada", "China", "Japan", "South Korea", "Israel", "Iran"];
pub const COUNTRIES_WITH_LARGER_SECOND_WAVE: [&str; 3] = ["Australia", "Israel", "Serbia"];
/// Countries that suppressed imported cases aggressively and early.
pub const IMPORT_SUPPRESSING_COUNTRIES: [&str; 3] = ["China", "South Korea", "Australia"];

/// Seasonal behaviour of transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seasonality {
    /// Same pattern as the US, with a fall uptick.
    Northern,
    Southern,
    None,
}

/// Country-level traits that change how trajectories are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryClass {
    pub is_us: bool,
    /// Hit early and with high testing capacity: faster IFR decline and
    /// faster detection ramp-up.
    pub early_impacted: bool,
    pub seasonality: Seasonality,
    pub larger_second_wave: bool,
    pub suppresses_imports: bool,
    /// Treatment improves faster after reopening.
    pub accelerated_reopen_care: bool,
}

impl CountryClass {
    pub fn of(country: &str) -> Self {
        let is_in = |list: &[&str]| list.contains(&country);
        let is_us = country == "US";
        let seasonality = if is_in(&SOUTHERN_HEMISPHERE_COUNTRIES) {
            Seasonality::Southern
        } else if is_in(&NON_SEASONAL_COUNTRIES) {
            Seasonality::None
        } else {
            Seasonality::Northern
        };
        CountryClass {
            is_us,
            early_impacted: is_in(&EARLY_IMPACTED_NON_EUROPEAN_COUNTRIES)
                || is_in(&EU_COUNTRIES)
                || is_in(&OTHER_EUROPEAN_COUNTRIES),
            seasonality,
            larger_second_wave: is_in(&COUNTRIES_WITH_LARGER_SECOND_WAVE),
            suppresses_imports: is_in(&IMPORT_SUPPRESSING_COUNTRIES),
            accelerated_reopen_care: is_us,
        }
    }

    pub fn of_region(identity: &RegionIdentity) -> Self {
        Self::of(identity.country())
    }

    /// True for countries following the US seasonal pattern.
    pub fn has_us_seasonality(&self) -> bool {
        self.seasonality == Seasonality::Northern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_countries() {
        let us = CountryClass::of("US");
        assert!(us.is_us && us.early_impacted && us.accelerated_reopen_care);
        assert!(us.has_us_seasonality());

        let italy = CountryClass::of("Italy");
        assert!(italy.early_impacted && !italy.is_us && !italy.accelerated_reopen_care);

        let brazil = CountryClass::of("Brazil");
        assert!(!brazil.early_impacted);
        assert_eq!(brazil.seasonality, Seasonality::None);

        let australia = CountryClass::of("Australia");
        assert_eq!(australia.seasonality, Seasonality::Southern);
        assert!(australia.larger_second_wave && australia.suppresses_imports);

        assert!(CountryClass::of("Serbia").early_impacted);
        assert!(!CountryClass::of("Mexico").early_impacted);
    }
}
