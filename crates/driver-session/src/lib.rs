//! Driver Session Module
//!
//! Owns one driver's monitoring session:
//! - Check-in intake and session record
//! - Start / stop / restart of eye-state sampling
//! - Routing drowsy observations into alerts
//! - Total teardown when the driver ends the session

mod controller;
mod runner;
mod session;

pub use controller::{SessionController, SessionControllerBuilder, SessionPhase};
pub use runner::SessionRunner;
pub use session::{CheckIn, DriverSession};

use thiserror::Error;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Check-in is missing {0}")]
    MissingField(&'static str),

    #[error("No eye-state detector configured")]
    MissingDetector,

    #[error("No clock configured")]
    MissingClock,
}
