//! Alerting System
//!
//! Turns drowsy observations into alerts, keeps per-session alert history,
//! and derives the active (most urgent, most recent) alert.

mod alert;
mod manager;
mod notifier;

pub use alert::{Alert, AlertFactory, AlertId, AlertKind, AlertSubject, Severity};
pub use manager::{AggregatorConfig, AlertAggregator};
pub use notifier::{AlertNotifier, LoggingNotifier, NullNotifier};
