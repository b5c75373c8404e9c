//! Clock abstractions

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Timestamp type used across the pipeline
pub type Timestamp = DateTime<Utc>;

/// Source of "now" for every component that stamps records
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// Wall clock that never goes backwards.
///
/// Readings have microsecond resolution and are clamped to the latest
/// value handed out, so a wall-clock step backwards (NTP adjustment)
/// yields repeated timestamps instead of decreasing ones.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_micros: AtomicI64,
}

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Utc::now();
        let micros = wall.timestamp_micros();
        let latest = self
            .last_micros
            .fetch_max(micros, Ordering::AcqRel)
            .max(micros);

        DateTime::<Utc>::from_timestamp_micros(latest).unwrap_or(wall)
    }
}

/// Manually driven clock for deterministic tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the Unix epoch
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Jump to an absolute time
    pub fn set(&self, at: Timestamp) {
        *self.now.lock() = at;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::milliseconds(by.as_millis() as i64);
        let mut now = self.now.lock();
        *now = *now + delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
