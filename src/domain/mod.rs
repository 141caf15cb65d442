//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - synthesized series values (`TimePoint`, `PriceSeries`, `VolatilityPoint`, `CorrelationSample`)
//! - generation parameters (`PriceParams`, `VolatilityParams`, `DriverParams`, `SynthParams`)
//! - dashboard enums (`HighlightTarget`, `Severity`, `SparkKind`) and `BriefConfig`

pub mod types;

pub use types::*;
