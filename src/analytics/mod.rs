//! Statistics derived from the synthesized series.
//!
//! - driver correlation and regression line (`drivers`)
//! - key metrics shown next to the charts (`metrics`)

pub mod drivers;
pub mod metrics;

pub use drivers::*;
pub use metrics::*;
