//! Renewal simulation of infections, hospitalizations and deaths.
mod engine;
mod imports;
mod kernels;
mod output;

pub use engine::*;
pub use imports::*;
pub use kernels::*;
pub use output::*;

use serde::Serialize;

/// Options that may change between runs of the same projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunOptions {
    /// If false, the hospitalization series is all NaN.
    pub compute_hospitalizations: bool,
    pub quarantine: Option<Quarantine>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            compute_hospitalizations: true,
            quarantine: None,
        }
    }
}
