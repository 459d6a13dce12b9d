use super::{ConvolutionKernel, ImportSchedule, Kernels, RunOptions, SimulationOutput};
use crate::{
    ensure_domain,
    error::Result,
    params::{HospitalConstants, ModelConstants},
    prelude::{Real, NAN},
    region::SimulationWindow,
    trajectory::DerivedTrajectories,
};
use log::{debug, warn};
use ndarray::prelude::*;
use rayon::prelude::*;

/// Renewal-equation simulation over a fixed window.
///
/// The engine borrows every input and never mutates them. Each call to
/// [`RenewalEngine::run`] allocates a fresh output, so runs are independent
/// and bit-identical for the same options.
#[derive(Debug, Clone, Copy)]
pub struct RenewalEngine<'a> {
    window: &'a SimulationWindow,
    trajectories: &'a DerivedTrajectories,
    kernels: &'a Kernels,
    imports: &'a ImportSchedule,
    population: u64,
    constants: &'a ModelConstants,
}

impl<'a> RenewalEngine<'a> {
    pub fn new(
        window: &'a SimulationWindow,
        trajectories: &'a DerivedTrajectories,
        kernels: &'a Kernels,
        imports: &'a ImportSchedule,
        population: u64,
        constants: &'a ModelConstants,
    ) -> Result<Self> {
        let n = window.n_days();
        ensure_domain!(
            trajectories.n_days() == n
                && trajectories.ifr().len() == n
                && trajectories.undetected().len() == n
                && imports.values().len() == n,
            "trajectories do not match the {} days of the simulation window",
            n
        );
        ensure_domain!(population > 0, "population must be positive");
        ensure_domain!(
            kernels.death_delay.center() <= constants.days_before_death,
            "death kernel half-width {} exceeds days before death {}",
            kernels.death_delay.center(),
            constants.days_before_death
        );
        ensure_domain!(
            n > constants.death_horizon(),
            "simulation window of {} days is shorter than the infection to death horizon of {} days",
            n,
            constants.death_horizon()
        );
        Ok(RenewalEngine {
            window,
            trajectories,
            kernels,
            imports,
            population,
            constants,
        })
    }

    pub fn n_days(&self) -> usize {
        self.window.n_days()
    }

    /// Run the simulation.
    pub fn run(&self, options: &RunOptions) -> Result<SimulationOutput> {
        let kernel = match &options.quarantine {
            Some(quarantine) => self.kernels.infectious.reversed_with_quarantine(quarantine),
            None => self.kernels.infectious.reversed(),
        };
        let (infections, effective_r) = self.infections(&kernel);

        let hospitalizations = if options.compute_hospitalizations {
            hospitalizations(&infections, &self.constants.hospital)
        } else {
            Array1::from_elem(self.n_days(), NAN)
        };
        let deaths = true_deaths(
            &infections,
            self.trajectories.ifr(),
            &self.kernels.death_delay,
            self.constants.days_before_death,
        )?;
        let reported_deaths = reported_deaths(&deaths, self.trajectories.undetected(), &self.kernels.report_lag);

        let total_infections = infections.sum();
        let final_fraction_infected = (total_infections / self.population as Real).min(1.0);
        debug!(
            "simulated {} days: {:.0} infections, {:.0} reported deaths",
            self.n_days(),
            total_infections,
            reported_deaths.sum()
        );

        Ok(SimulationOutput::new(
            self.window.dates(),
            infections.to_vec(),
            hospitalizations.to_vec(),
            reported_deaths.to_vec(),
            effective_r.to_vec(),
            self.trajectories.ifr().clone(),
            final_fraction_infected,
        ))
    }

    /// Sequential infections loop. Returns new infections and the effective R
    /// used on each day.
    fn infections(&self, kernel: &Array1<Real>) -> (Array1<Real>, Array1<Real>) {
        let n = self.n_days();
        let r = self.trajectories.r();
        let immunity = self.trajectories.immunity_multiplier();
        let incubation_days = self.constants.incubation_days;
        let seeding_days = incubation_days + kernel.len();
        let population = self.population as Real;
        let cap_at_susceptible = self.constants.transmission.cap_at_susceptible;

        let mut infections = Array1::<Real>::zeros(n);
        let mut effective_r = Array1::<Real>::zeros(n);
        let mut cumulative = 0.0;
        let mut saturated = false;

        for i in 0..n {
            if i < seeding_days {
                infections[i] = self.imports.at(i);
                effective_r[i] = r[i];
            } else {
                let fraction = (cumulative / population).min(1.0);
                if fraction >= 1.0 && !saturated {
                    warn!("whole population infected by day {}", i);
                    saturated = true;
                }
                let r_eff = r[i] * (1.0 - fraction).powf(immunity);
                let end = i - incubation_days + 1;
                let infectious = infections.slice(s![end - kernel.len()..end]).dot(kernel);
                let mut local = r_eff * infectious;
                if cap_at_susceptible {
                    local = local.min((population - cumulative).max(0.0));
                }
                infections[i] = local + self.imports.at(i);
                effective_r[i] = r_eff;
            }
            cumulative += infections[i];
        }
        (infections, effective_r)
    }
}

/// Hospital beds occupied on each day: a fixed share of the infections
/// between days_until_hospitalization + days_in_hospital and
/// days_until_hospitalization days ago.
pub fn hospitalizations(infections: &Array1<Real>, constants: &HospitalConstants) -> Array1<Real> {
    let offset = constants.days_until_hospitalization;
    let stay = constants.days_in_hospital;
    (0..infections.len())
        .map(|i| {
            let end = i.saturating_sub(offset);
            let start = i.saturating_sub(offset + stay);
            (constants.hospitalization_rate * infections.slice(s![start..end]).sum()).floor()
        })
        .collect()
}

/// True deaths on each day.
///
/// Deaths on day d come from infections around d - days_before_death, spread
/// by the death kernel, times the IFR of day d. Days before the start of the
/// window contribute nothing. Fails if the kernel half-width exceeds
/// days_before_death.
pub fn true_deaths(
    infections: &Array1<Real>,
    ifr: &[Real],
    kernel: &ConvolutionKernel,
    days_before_death: usize,
) -> Result<Array1<Real>> {
    ensure_domain!(
        kernel.center() <= days_before_death,
        "death kernel half-width {} exceeds days before death {}",
        kernel.center(),
        days_before_death
    );
    ensure_domain!(
        ifr.len() == infections.len(),
        "IFR has {} days but infections have {}",
        ifr.len(),
        infections.len()
    );
    let len = kernel.len();
    let first_day = days_before_death - kernel.center();
    let weights = kernel.reversed();

    let deaths: Vec<Real> = (0..infections.len())
        .into_par_iter()
        .map(|d| {
            if d < first_day {
                return 0.0;
            }
            let end = d - first_day + 1;
            let skip = len.saturating_sub(end);
            let start = end + skip - len;
            let total = infections
                .slice(s![start..end])
                .dot(&weights.slice(s![skip..]));
            ifr[d] * total
        })
        .collect();
    Ok(Array1::from(deaths))
}

/// Reported deaths: detected deaths spread forward by the report lag and
/// truncated at the end of the window.
pub fn reported_deaths(deaths: &Array1<Real>, undetected: &[Real], report_lag: &ConvolutionKernel) -> Array1<Real> {
    let detected: Array1<Real> = deaths
        .iter()
        .zip(undetected)
        .map(|(d, u)| d * (1.0 - u))
        .collect();
    let len = report_lag.len();
    let weights = report_lag.reversed();

    let reported: Vec<Real> = (0..detected.len())
        .into_par_iter()
        .map(|j| {
            let start = (j + 1).saturating_sub(len);
            let n = j + 1 - start;
            detected
                .slice(s![start..=j])
                .dot(&weights.slice(s![len - n..]))
        })
        .collect();
    Array1::from(reported)
}
