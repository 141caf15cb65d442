//! Synthetic data sources.
//!
//! - `synth`: seeded hourly price, volatility and driver-scatter generation

pub mod synth;

pub use synth::*;
