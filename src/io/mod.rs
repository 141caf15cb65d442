//! Output helpers.
//!
//! - hourly price CSV export (`export`)
//! - brief JSON read/write (`brief`)
//! - standalone sparkline SVG (`svg`)

pub mod brief;
pub mod export;
pub mod svg;

pub use brief::*;
pub use export::*;
pub use svg::*;
