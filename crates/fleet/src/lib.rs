//! Fleet Status Engine
//!
//! Tracks the control-room roster:
//! - Validated driver roster with status summary
//! - Periodic risk-status escalation / de-escalation
//! - Critical-transition events for the control room

mod engine;
mod feed;
mod monitor;
mod roster;

pub use engine::{
    FleetConfig, FleetStatusEngine, FleetStatusEngineBuilder, SimulatedStatusSource, StatusSource,
    TickReport,
};
pub use feed::{ControlRoomFeed, ControlRoomNotifier, CriticalTransition, LoggingControlRoom};
pub use monitor::FleetMonitor;
pub use roster::{DriverRegistration, DriverStatus, FleetDriverRecord, FleetRoster, FleetSummary};

use thiserror::Error;

/// Fleet error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FleetError {
    #[error("Roster entry {index} is malformed: missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("Duplicate driver id in roster: {0}")]
    DuplicateId(String),

    #[error("No clock configured for the fleet engine")]
    MissingClock,

    #[error("No status source configured for the fleet engine")]
    MissingStatusSource,

    #[error("Configuration error: {0}")]
    Config(String),
}
