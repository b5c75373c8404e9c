//! Driver Monitoring System (DMS)
//!
//! Per-session eye-state sampling:
//! - Eye-state classification (open / closed / drowsy)
//! - Discrete drowsy and normal observation events
//! - Pluggable detector capability so a camera-backed detector can replace
//!   the stochastic simulation

pub mod config;
pub mod detector;
pub mod state;

pub use config::SamplerConfig;
pub use detector::{EyeStateDetector, SimulatedEyeDetector, SimulatedEyeDetectorBuilder};
pub use state::{EyeRisk, EyeState, Observation, ObservationEvent};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("No random source configured for the simulated detector")]
    MissingRandomSource,

    #[error("Configuration error: {0}")]
    Config(String),
}
