//! Plot geometry independent of any rendering surface.

pub mod spark;

pub use spark::*;
