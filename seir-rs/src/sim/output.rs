use crate::prelude::{Date, Real};
use getset::{CopyGetters, Getters};
use serde::Serialize;

/// Aligned daily series produced by one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
pub struct SimulationOutput {
    #[getset(get = "pub")]
    dates: Vec<Date>,
    #[getset(get = "pub")]
    infections: Vec<Real>,
    /// Hospital beds occupied. NaN on every day if not computed.
    #[getset(get = "pub")]
    hospitalizations: Vec<Real>,
    #[getset(get = "pub")]
    reported_deaths: Vec<Real>,
    #[getset(get = "pub")]
    effective_r: Vec<Real>,
    #[getset(get = "pub")]
    ifr: Vec<Real>,
    /// Fraction of the population infected by the end of the window.
    #[getset(get_copy = "pub")]
    final_fraction_infected: Real,
}

/// A single row of output, as written to CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputRow {
    pub date: Date,
    pub infections: Real,
    pub hospitalizations: Real,
    pub deaths: Real,
    pub mean_r_t: Real,
}

impl SimulationOutput {
    pub(crate) fn new(
        dates: Vec<Date>,
        infections: Vec<Real>,
        hospitalizations: Vec<Real>,
        reported_deaths: Vec<Real>,
        effective_r: Vec<Real>,
        ifr: Vec<Real>,
        final_fraction_infected: Real,
    ) -> Self {
        SimulationOutput {
            dates,
            infections,
            hospitalizations,
            reported_deaths,
            effective_r,
            ifr,
            final_fraction_infected,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn total_infections(&self) -> Real {
        self.infections.iter().sum()
    }

    pub fn total_deaths(&self) -> Real {
        self.reported_deaths.iter().sum()
    }

    /// Maximum number of occupied hospital beds, or None if hospitalizations
    /// were not computed.
    pub fn peak_hospitalizations(&self) -> Option<Real> {
        self.hospitalizations
            .iter()
            .copied()
            .filter(|x| !x.is_nan())
            .fold(None, |acc, x| Some(acc.map_or(x, |m: Real| m.max(x))))
    }

    /// First date in which hospital occupancy exceeds the given capacity.
    pub fn hospital_overflow_date(&self, beds: u64) -> Option<Date> {
        self.dates
            .iter()
            .zip(&self.hospitalizations)
            .find(|(_, h)| **h > beds as Real)
            .map(|(&date, _)| date)
    }

    /// Output restricted to dates on or after start.
    pub fn since(&self, start: Date) -> SimulationOutput {
        let skip = self.dates.iter().take_while(|&&d| d < start).count();
        let tail = |xs: &Vec<Real>| xs[skip..].to_vec();
        SimulationOutput {
            dates: self.dates[skip..].to_vec(),
            infections: tail(&self.infections),
            hospitalizations: tail(&self.hospitalizations),
            reported_deaths: tail(&self.reported_deaths),
            effective_r: tail(&self.effective_r),
            ifr: tail(&self.ifr),
            final_fraction_infected: self.final_fraction_infected,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        (0..self.len()).map(move |i| OutputRow {
            date: self.dates[i],
            infections: self.infections[i],
            hospitalizations: self.hospitalizations[i],
            deaths: self.reported_deaths[i],
            mean_r_t: self.effective_r[i],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::NAN;

    fn output(hospitalizations: Vec<Real>) -> SimulationOutput {
        let first: Date = "2020-03-01".parse().unwrap();
        let dates = crate::utils::date_range(first, "2020-03-04".parse().unwrap());
        SimulationOutput::new(
            dates,
            vec![10.0, 20.0, 30.0, 40.0],
            hospitalizations,
            vec![0.0, 1.0, 2.0, 3.0],
            vec![2.0, 1.5, 1.2, 1.0],
            vec![0.01; 4],
            0.001,
        )
    }

    #[test]
    fn totals_and_rows() {
        let out = output(vec![0.0, 5.0, 9.0, 7.0]);
        assert_eq!(out.total_infections(), 100.0);
        assert_eq!(out.total_deaths(), 6.0);
        assert_eq!(out.peak_hospitalizations(), Some(9.0));
        let rows: Vec<OutputRow> = out.rows().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].mean_r_t, 1.2);
        assert_eq!(rows[3].deaths, 3.0);
    }

    #[test]
    fn hospital_overflow() {
        let out = output(vec![0.0, 5.0, 9.0, 7.0]);
        assert_eq!(out.hospital_overflow_date(6), Some("2020-03-03".parse::<Date>().unwrap()));
        assert_eq!(out.hospital_overflow_date(10), None);
        assert_eq!(output(vec![NAN; 4]).hospital_overflow_date(0), None);
    }

    #[test]
    fn tail_since_date() {
        let out = output(vec![NAN; 4]).since("2020-03-03".parse().unwrap());
        assert_eq!(out.len(), 2);
        assert_eq!(out.infections(), &vec![30.0, 40.0]);
        assert_eq!(out.peak_hospitalizations(), None);
    }
}
