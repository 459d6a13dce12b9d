//! Error types for projections.
//!
//! Every error is a modeling-input error: construction aborts at the first
//! failure and no partial output is produced.
use crate::prelude::Real;
use thiserror::Error;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// A parameter is missing, outside its domain or violates an ordering
    /// constraint.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A kernel is not a probability mass function or the simulation window
    /// cannot hold the death-delay horizon.
    #[error("domain error: {0}")]
    Domain(String),

    /// The R trajectory changed too abruptly between consecutive days after
    /// reopening.
    #[error("R changed too quickly on day {day_idx}: {previous:.4} -> {current:.4} (tolerance: {tolerance})")]
    Instability {
        day_idx: usize,
        previous: Real,
        current: Real,
        tolerance: Real,
    },
}

impl ProjectionError {
    pub fn config(message: impl Into<String>) -> Self {
        ProjectionError::Configuration(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        ProjectionError::Domain(message.into())
    }
}

/// Return early with a configuration error if the condition does not hold.
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::ProjectionError::config(format!($($arg)+)));
        }
    };
}

/// Return early with a domain error if the condition does not hold.
#[macro_export]
macro_rules! ensure_domain {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::ProjectionError::domain(format!($($arg)+)));
        }
    };
}
