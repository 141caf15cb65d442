//! `energy-sensemaker` library crate.
//!
//! The binary (`sm`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the synthesizer and sparkline geometry are reusable outside the CLI/TUI
//! - code stays easy to navigate as the project grows

pub mod analytics;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
