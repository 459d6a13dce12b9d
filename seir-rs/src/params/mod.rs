//! Parameters of a projection.
//!
//! Parameters come in two layers. RawParams is what a parameter store or a
//! user provides: a flat, name-addressable record in which every value is
//! optional. ParameterVector is the validated result of resolving RawParams
//! for a region and a simulation window, with defaults filled and uncertain
//! values drawn once. Model-wide constants live in ModelConstants and are
//! passed explicitly to every builder.
mod constants;
mod countries;
mod macros;
mod raw;
mod vector;

pub use constants::*;
pub use countries::*;
pub use raw::*;
pub use vector::*;
