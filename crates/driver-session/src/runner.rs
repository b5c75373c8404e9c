//! Periodic session runner

use alerting::AlertId;
use parking_lot::Mutex;
use std::sync::Arc;
use timing::PeriodicTask;
use tracing::info;

use crate::{SessionController, SessionPhase};

/// Owns a session controller and samples it on its tick cadence.
///
/// The controller sits behind a single lock that every tick and every
/// operator action goes through.
pub struct SessionRunner {
    controller: Arc<Mutex<SessionController>>,
    task: Option<PeriodicTask>,
}

impl SessionRunner {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            task: None,
        }
    }

    /// Start (or restart) monitoring and schedule sampling
    pub fn start(&mut self) {
        let interval = {
            let mut controller = self.controller.lock();
            controller.start();
            controller.sample_interval()
        };

        if self.task.is_none() {
            let controller = Arc::clone(&self.controller);
            self.task = Some(PeriodicTask::spawn("eye-sampler", interval, move || {
                controller.lock().tick();
            }));
        }
    }

    /// Stop monitoring and cancel sampling. Safe to call repeatedly.
    pub fn stop(&mut self) {
        // phase first: a tick racing with the cancel sees Stopped and no-ops
        self.controller.lock().stop();
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }

    /// Flip monitoring on or off
    pub fn toggle_monitoring(&mut self) -> SessionPhase {
        if self.phase() == SessionPhase::Monitoring {
            self.stop();
        } else {
            self.start();
        }
        self.phase()
    }

    pub fn phase(&self) -> SessionPhase {
        self.controller.lock().phase()
    }

    pub fn is_sampling(&self) -> bool {
        self.task.as_ref().is_some_and(PeriodicTask::is_running)
    }

    /// Acknowledge an alert
    pub fn acknowledge(&self, id: AlertId) -> bool {
        self.controller.lock().acknowledge(id)
    }

    /// Read the controller under its lock
    pub fn with<T>(&self, f: impl FnOnce(&SessionController) -> T) -> T {
        f(&self.controller.lock())
    }

    /// Flip the alert sound, returning the new setting
    pub fn toggle_sound(&self) -> bool {
        self.controller.lock().toggle_sound()
    }

    /// Driver logout: cancel sampling and discard the session and its history
    pub fn end_session(mut self) {
        self.stop();
        self.controller.lock().teardown();
        info!("Session runner shut down");
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckIn;
    use alerting::{Alert, AlertNotifier};
    use dms::{EyeState, SimulatedEyeDetector};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use timing::{ScriptedSource, SystemClock};

    #[derive(Default)]
    struct CountingNotifier {
        raised: AtomicUsize,
        cleared: AtomicUsize,
    }

    impl AlertNotifier for CountingNotifier {
        fn on_active_alert_changed(&self, alert: Option<&Alert>, _sound_enabled: bool) {
            match alert {
                Some(_) => self.raised.fetch_add(1, Ordering::SeqCst),
                None => self.cleared.fetch_add(1, Ordering::SeqCst),
            };
        }
    }

    fn runner(values: Vec<f64>, notifier: Arc<CountingNotifier>) -> SessionRunner {
        let detector = SimulatedEyeDetector::builder()
            .random_source(ScriptedSource::new(values))
            .build()
            .unwrap();
        let controller = SessionController::builder()
            .check_in(CheckIn {
                name: "Sarah Chen".into(),
                vehicle_id: "TR-023".into(),
                ..Default::default()
            })
            .detector(detector)
            .clock(Arc::new(SystemClock::new()))
            .notifier(notifier)
            .sample_interval(Duration::from_millis(2_000))
            .build()
            .unwrap();
        SessionRunner::new(controller)
    }

    #[tokio::test(start_paused = true)]
    async fn test_drowsy_first_tick_then_open() {
        let notifier = Arc::new(CountingNotifier::default());
        let mut runner = runner(vec![0.05, 0.5, 0.5], notifier.clone());
        runner.start();
        assert!(runner.is_sampling());

        tokio::time::sleep(Duration::from_millis(6_100)).await;

        runner.with(|controller| {
            assert_eq!(controller.history_len(), 1);
            let active = controller.active_alert().unwrap();
            assert_eq!(active.vehicle_id(), "TR-023");
            assert_eq!(controller.session().alert_count, 1);
            assert_eq!(controller.eye_state(), EyeState::Open);
        });
        assert_eq!(notifier.raised.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_sampling() {
        let notifier = Arc::new(CountingNotifier::default());
        let mut runner = runner(vec![0.0], notifier);
        runner.start();

        tokio::time::sleep(Duration::from_millis(4_100)).await;
        runner.stop();
        runner.stop();
        assert_eq!(runner.phase(), SessionPhase::Stopped);
        assert!(!runner.is_sampling());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runner.with(|c| c.session().alert_count), 2);

        // restart resumes sampling
        assert_eq!(runner.toggle_monitoring(), SessionPhase::Monitoring);
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(runner.with(|c| c.session().alert_count), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_and_sampling_stay_in_step() {
        let notifier = Arc::new(CountingNotifier::default());
        let mut runner = runner(vec![0.0], notifier);
        assert_eq!(runner.phase(), SessionPhase::NotStarted);
        assert!(!runner.is_sampling());

        for _ in 0..3 {
            assert_eq!(runner.toggle_monitoring(), SessionPhase::Monitoring);
            assert!(runner.is_sampling());
            assert_eq!(runner.toggle_monitoring(), SessionPhase::Stopped);
            assert!(!runner.is_sampling());
        }

        runner.start();
        runner.start();
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(runner.phase(), SessionPhase::Monitoring);
        assert!(runner.is_sampling());
        assert_eq!(runner.with(|c| c.session().alert_count), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_sound_reaches_aggregator() {
        let notifier = Arc::new(CountingNotifier::default());
        let runner = runner(vec![0.5], notifier);

        assert!(runner.with(SessionController::sound_enabled));
        assert!(!runner.toggle_sound());
        assert!(!runner.with(SessionController::sound_enabled));
        assert!(runner.toggle_sound());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_session_discards_history() {
        let notifier = Arc::new(CountingNotifier::default());
        let mut runner = runner(vec![0.0], notifier.clone());
        runner.start();

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        let id = runner.with(|c| c.active_alert().map(Alert::id)).unwrap();
        assert!(runner.acknowledge(id));
        assert!(!runner.acknowledge(id));

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        runner.end_session();

        // one clear from the acknowledge, one from teardown
        assert_eq!(notifier.cleared.load(Ordering::SeqCst), 2);
    }
}
