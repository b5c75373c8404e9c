//! Session controller

use alerting::{
    AggregatorConfig, Alert, AlertAggregator, AlertFactory, AlertId, AlertNotifier, NullNotifier,
};
use dms::{EyeState, EyeStateDetector, Observation, SamplerConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use timing::Clock;
use tracing::{debug, info};

use crate::{CheckIn, DriverSession, SessionError};

/// Monitoring lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Monitoring,
    Stopped,
}

/// Drives one driver's monitoring session.
///
/// Each [`tick`](Self::tick) samples the detector and, on a drowsy
/// observation, creates the alert, records it and bumps the session
/// counters before returning.
pub struct SessionController {
    session: DriverSession,
    phase: SessionPhase,
    eye_state: EyeState,
    detector: Box<dyn EyeStateDetector>,
    factory: AlertFactory,
    aggregator: AlertAggregator,
    sample_interval: Duration,
}

impl SessionController {
    /// Start building a controller
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    /// Begin (or resume) monitoring. Returns whether the phase changed.
    pub fn start(&mut self) -> bool {
        if self.phase == SessionPhase::Monitoring {
            return false;
        }
        self.phase = SessionPhase::Monitoring;
        self.session.is_monitoring = true;
        info!(
            "Monitoring started for {} ({}) using {} detector",
            self.session.driver_name,
            self.session.vehicle_id,
            self.detector.name()
        );
        true
    }

    /// Pause monitoring. Returns whether the phase changed.
    pub fn stop(&mut self) -> bool {
        if self.phase != SessionPhase::Monitoring {
            return false;
        }
        self.phase = SessionPhase::Stopped;
        self.session.is_monitoring = false;
        info!("Monitoring stopped for {}", self.session.driver_name);
        true
    }

    /// Flip between monitoring and stopped
    pub fn toggle_monitoring(&mut self) -> SessionPhase {
        if self.phase == SessionPhase::Monitoring {
            self.stop();
        } else {
            self.start();
        }
        self.phase
    }

    /// Take one observation. Returns `None` unless monitoring.
    pub fn tick(&mut self) -> Option<Observation> {
        if self.phase != SessionPhase::Monitoring {
            return None;
        }

        let observation = self.detector.sample();
        self.eye_state = observation.state;

        if observation.is_drowsy() {
            let alert = self.factory.create_alert(&self.session);
            self.session.alert_count += 1;
            self.session.last_alert_at = Some(alert.created_at());
            self.aggregator.record(alert);
        } else {
            debug!("Observation for {}: {}", self.session.driver_name, observation.state);
        }

        Some(observation)
    }

    /// Operator acknowledged an alert. Unknown ids are ignored.
    pub fn acknowledge(&mut self, id: AlertId) -> bool {
        self.aggregator.acknowledge(id)
    }

    pub fn active_alert(&self) -> Option<&Alert> {
        self.aggregator.active_alert()
    }

    pub fn recent_history(&self, n: usize) -> Vec<&Alert> {
        self.aggregator.recent_history(n)
    }

    /// Recent history with the configured window
    pub fn recent(&self) -> Vec<&Alert> {
        self.aggregator.recent()
    }

    pub fn history_len(&self) -> usize {
        self.aggregator.len()
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.aggregator.toggle_sound()
    }

    pub fn sound_enabled(&self) -> bool {
        self.aggregator.sound_enabled()
    }

    /// Last classified eye state
    pub fn eye_state(&self) -> EyeState {
        self.eye_state
    }

    pub fn session(&self) -> &DriverSession {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Cadence the runner should tick at
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// End the session, discarding its record and alert history
    pub fn end(mut self) {
        self.teardown();
    }

    pub(crate) fn teardown(&mut self) {
        self.stop();
        self.aggregator.clear();
        info!(
            "Session ended for {} ({}) after {} alerts",
            self.session.driver_name, self.session.vehicle_id, self.session.alert_count
        );
    }
}

/// Builder for [`SessionController`]
#[derive(Default)]
pub struct SessionControllerBuilder {
    check_in: Option<CheckIn>,
    detector: Option<Box<dyn EyeStateDetector>>,
    clock: Option<Arc<dyn Clock>>,
    aggregator: AggregatorConfig,
    notifier: Option<Arc<dyn AlertNotifier>>,
    sample_interval: Option<Duration>,
}

impl SessionControllerBuilder {
    /// Check-in payload from the intake
    pub fn check_in(mut self, check_in: CheckIn) -> Self {
        self.check_in = Some(check_in);
        self
    }

    /// Eye-state detector (required)
    pub fn detector(mut self, detector: impl EyeStateDetector + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    /// Clock for alert timestamps (required)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn aggregator_config(mut self, config: AggregatorConfig) -> Self {
        self.aggregator = config;
        self
    }

    /// Collaborator told about active-alert changes
    pub fn notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sampling cadence (defaults to the sampler default)
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = Some(interval);
        self
    }

    /// Build the controller in the `NotStarted` phase
    pub fn build(self) -> Result<SessionController, SessionError> {
        let check_in = self.check_in.ok_or(SessionError::MissingField("check-in"))?;
        check_in.validate()?;
        let detector = self.detector.ok_or(SessionError::MissingDetector)?;
        let clock = self.clock.ok_or(SessionError::MissingClock)?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NullNotifier));

        let session = DriverSession::from_check_in(check_in, clock.now());
        info!(
            "Driver checked in: {} ({})",
            session.driver_name, session.vehicle_id
        );

        Ok(SessionController {
            session,
            phase: SessionPhase::NotStarted,
            eye_state: EyeState::default(),
            detector,
            factory: AlertFactory::new(clock),
            aggregator: AlertAggregator::new(self.aggregator, notifier),
            sample_interval: self
                .sample_interval
                .unwrap_or_else(|| SamplerConfig::default().tick_interval()),
        })
    }
}
