//! Cancellable periodic task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Handle to a body running every `period` on the tokio runtime.
///
/// The first run happens one full period after spawning. Once `cancel`
/// returns no further run starts; cancelling twice is a no-op. Dropping the
/// handle cancels the task.
pub struct PeriodicTask {
    name: String,
    period: Duration,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn a periodic task. Must be called from within a tokio runtime.
    pub fn spawn<F>(name: impl Into<String>, period: Duration, mut body: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        // tokio intervals reject a zero period
        let period = period.max(Duration::from_millis(1));
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancelled);
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                debug!("Periodic task '{}' tick", task_name);
                body();
            }
        });

        info!("Periodic task '{}' started ({:?} period)", name, period);

        Self {
            name,
            period,
            cancelled,
            handle: Some(handle),
        }
    }

    /// Stop the task
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancelled.store(true, Ordering::Release);
            handle.abort();
            info!("Periodic task '{}' cancelled", self.name);
        }
    }

    /// Whether the task is still scheduled
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}
