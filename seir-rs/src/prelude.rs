pub use crate::error::ProjectionError;
pub use crate::params::{
    CountryClass, ModelConstants, ParamValue, ParameterVector, PostReopenModel, RawParams,
    ReopenTarget, Seasonality,
};
pub use crate::projection::Projection;
pub use crate::region::{RegionIdentity, RegionMetadata, SimulationWindow};
pub use crate::sim::{
    ConvolutionKernel, ImportSchedule, Kernels, OutputRow, Quarantine, QuarantineTier,
    RunOptions, SimulationOutput,
};
pub use crate::trajectory::{build_trajectories, DerivedTrajectories, SigmoidTransition};
pub use chrono::NaiveDate;

/// Day index relative to the first date of a simulation window. Negative
/// values are valid for dates before the window starts.
pub type DayIdx = i64;

/// Base Real type used by this crate. Uses an alias to easily change precision
/// if necessary.
pub type Real = f64;
pub(crate) const NAN: Real = Real::NAN;

/// Calendar date type used by all public interfaces.
pub type Date = NaiveDate;
