//! Periodic fleet monitoring

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use timing::PeriodicTask;
use tracing::info;

use crate::{FleetRoster, FleetStatusEngine, FleetSummary, TickReport};

struct FleetState {
    engine: FleetStatusEngine,
    roster: FleetRoster,
}

/// Owns a roster and its engine, ticking them on a fixed period.
///
/// Every tick runs under one lock, so readers never see a half-applied
/// tick.
pub struct FleetMonitor {
    state: Arc<Mutex<FleetState>>,
    period: Duration,
    task: Option<PeriodicTask>,
}

impl FleetMonitor {
    pub fn new(engine: FleetStatusEngine, roster: FleetRoster, period: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FleetState { engine, roster })),
            period,
            task: None,
        }
    }

    /// Begin periodic ticks. No-op if already running.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let state = Arc::clone(&self.state);
        self.task = Some(PeriodicTask::spawn("fleet-status", self.period, move || {
            let mut guard = state.lock();
            let FleetState { engine, roster } = &mut *guard;
            engine.tick(roster);
        }));
        info!("Fleet monitor started");
    }

    /// Stop ticking. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
            info!("Fleet monitor torn down");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(PeriodicTask::is_running)
    }

    /// Run one tick immediately
    pub fn tick_now(&self) -> TickReport {
        let mut guard = self.state.lock();
        let FleetState { engine, roster } = &mut *guard;
        engine.tick(roster)
    }

    /// Read the roster
    pub fn with_roster<T>(&self, f: impl FnOnce(&FleetRoster) -> T) -> T {
        f(&self.state.lock().roster)
    }

    pub fn summary(&self) -> FleetSummary {
        self.with_roster(FleetRoster::summary)
    }
}

impl Drop for FleetMonitor {
    fn drop(&mut self) {
        self.teardown();
    }
}
