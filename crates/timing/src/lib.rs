//! Timing and Randomness Seams
//!
//! Provides the injectable collaborators every simulated component depends on:
//! - Wall clock (`Clock`) with a monotonic system implementation
//! - Uniform variate source (`RandomSource`) with seeded and scripted variants
//! - Cancellable periodic tasks (`PeriodicTask`) on the tokio runtime

mod clock;
mod random;
mod task;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use task::PeriodicTask;
