//! Deterministic regional epidemic projections.
//!
//! A projection turns a resolved parameter vector into a smooth reproduction
//! number curve, infection fatality and undetected-death curves and then runs
//! a discrete renewal process to obtain daily infections, occupied hospital
//! beds and reported deaths.
//!
//! ```no_run
//! use seir::prelude::*;
//!
//! # fn main() -> seir::error::Result<()> {
//! let date = |s: &str| s.parse::<NaiveDate>().unwrap();
//! let window = SimulationWindow::new(date("2020-02-01"), None, date("2020-10-01"))?;
//! let identity = RegionIdentity::for_country("US");
//! let metadata = RegionMetadata::new(332_000_000, 2.8)?;
//! let raw = RawParams::default_us();
//! let projection = Projection::new(identity, metadata, window, raw, ModelConstants::default())?;
//! let output = projection.run()?;
//! println!("total deaths: {}", output.total_deaths());
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod params;
pub mod prelude;
pub mod projection;
pub mod region;
pub mod sim;
pub mod trajectory;
pub mod utils;
