//! Fleet status engine

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use timing::{Clock, RandomSource};
use tracing::{debug, info, warn};

use crate::{
    ControlRoomNotifier, CriticalTransition, DriverStatus, FleetDriverRecord, FleetError,
    FleetRoster,
};

/// Fleet engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Interval between fleet ticks (milliseconds)
    pub tick_interval_ms: u64,
    /// Per-record probability of drawing a new status each tick
    pub change_probability: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5000,
            change_probability: 0.05,
        }
    }
}

impl FleetConfig {
    /// Tick interval as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), FleetError> {
        if !(0.0..=1.0).contains(&self.change_probability) {
            return Err(FleetError::Config(format!(
                "change probability {} outside [0, 1]",
                self.change_probability
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(FleetError::Config("tick interval must be non-zero".into()));
        }
        Ok(())
    }
}

/// Risk-scoring seam: proposes a replacement status for a record, if any
pub trait StatusSource: Send {
    fn next_status(&mut self, record: &FleetDriverRecord) -> Option<DriverStatus>;
}

/// Stochastic risk feed: with `change_probability`, a uniformly chosen
/// status replaces the current one
pub struct SimulatedStatusSource {
    change_probability: f64,
    source: Box<dyn RandomSource>,
}

impl SimulatedStatusSource {
    pub fn new(change_probability: f64, source: Box<dyn RandomSource>) -> Self {
        Self {
            change_probability,
            source,
        }
    }
}

impl StatusSource for SimulatedStatusSource {
    fn next_status(&mut self, _record: &FleetDriverRecord) -> Option<DriverStatus> {
        if self.source.uniform() >= self.change_probability {
            return None;
        }
        let index = (self.source.uniform() * DriverStatus::ALL.len() as f64) as usize;
        Some(DriverStatus::ALL[index.min(DriverStatus::ALL.len() - 1)])
    }
}

/// Outcome of one fleet tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Records whose status was replaced (possibly by the same value)
    pub replaced: usize,
    /// Entries into critical status, in roster order
    pub critical: Vec<CriticalTransition>,
}

/// Advances every roster record's risk status
pub struct FleetStatusEngine {
    clock: Arc<dyn Clock>,
    source: Box<dyn StatusSource>,
    notifier: Option<Arc<dyn ControlRoomNotifier>>,
}

impl FleetStatusEngine {
    /// Start building an engine
    pub fn builder() -> FleetStatusEngineBuilder {
        FleetStatusEngineBuilder::default()
    }

    /// Apply one tick to `roster`.
    ///
    /// A record entering Danger from another status gets `alert_count + 1`
    /// and raises a critical transition. Any non-Safe replacement stamps
    /// `last_alert_at`.
    pub fn tick(&mut self, roster: &mut FleetRoster) -> TickReport {
        let mut report = TickReport::default();
        if roster.is_empty() {
            debug!("Fleet tick over empty roster");
            return report;
        }

        let now = self.clock.now();
        for record in roster.records_mut() {
            let Some(next) = self.source.next_status(record) else {
                continue;
            };

            let previous = record.status;
            record.status = next;
            report.replaced += 1;

            if next != DriverStatus::Safe {
                record.last_alert_at = Some(now);
            }

            if next == DriverStatus::Danger && previous != DriverStatus::Danger {
                record.alert_count += 1;
                let transition = CriticalTransition {
                    driver_id: record.id().to_string(),
                    name: record.name().to_string(),
                    vehicle_id: record.vehicle_id().to_string(),
                    timestamp: now,
                };
                warn!(
                    "Driver {} ({}) entered critical status (alerts: {})",
                    record.name(),
                    record.vehicle_id(),
                    record.alert_count
                );
                metrics::counter!("driveguard_fleet_critical_transitions_total").increment(1);
                if let Some(notifier) = &self.notifier {
                    notifier.on_critical_transition(&transition);
                }
                report.critical.push(transition);
            } else if previous != next {
                debug!(
                    "Driver {} status {} -> {}",
                    record.id(),
                    previous.as_str(),
                    next.as_str()
                );
            }
        }

        report
    }
}

/// Builder for [`FleetStatusEngine`]
#[derive(Default)]
pub struct FleetStatusEngineBuilder {
    clock: Option<Arc<dyn Clock>>,
    source: Option<Box<dyn StatusSource>>,
    notifier: Option<Arc<dyn ControlRoomNotifier>>,
}

impl FleetStatusEngineBuilder {
    /// Clock stamping `last_alert_at` (required)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Status source (required)
    pub fn status_source(mut self, source: impl StatusSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Stochastic status source built from `config` and a random source
    pub fn simulated(
        self,
        config: &FleetConfig,
        random: impl RandomSource + 'static,
    ) -> Result<Self, FleetError> {
        config.validate()?;
        Ok(self.status_source(SimulatedStatusSource::new(
            config.change_probability,
            Box::new(random),
        )))
    }

    /// Control-room collaborator receiving critical transitions
    pub fn notifier(mut self, notifier: Arc<dyn ControlRoomNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<FleetStatusEngine, FleetError> {
        let clock = self.clock.ok_or(FleetError::MissingClock)?;
        let source = self.source.ok_or(FleetError::MissingStatusSource)?;
        info!("Fleet status engine ready");
        Ok(FleetStatusEngine {
            clock,
            source,
            notifier: self.notifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ControlRoomFeed, DriverRegistration};
    use timing::{ManualClock, RngSource, ScriptedSource};

    fn roster_with(status: DriverStatus) -> FleetRoster {
        FleetRoster::new(vec![DriverRegistration {
            id: "1".into(),
            name: "John Smith".into(),
            vehicle_id: "TR-001".into(),
            status,
            ..Default::default()
        }])
        .unwrap()
    }

    fn scripted_engine(
        values: &[f64],
        clock: Arc<ManualClock>,
        notifier: Arc<dyn ControlRoomNotifier>,
    ) -> FleetStatusEngine {
        FleetStatusEngine::builder()
            .clock(clock)
            .simulated(&FleetConfig::default(), ScriptedSource::new(values.to_vec()))
            .unwrap()
            .notifier(notifier)
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_collaborators() {
        assert!(matches!(
            FleetStatusEngine::builder().build(),
            Err(FleetError::MissingClock)
        ));
        assert!(matches!(
            FleetStatusEngine::builder()
                .clock(Arc::new(ManualClock::at_epoch()))
                .build(),
            Err(FleetError::MissingStatusSource)
        ));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let config = FleetConfig {
            change_probability: 1.5,
            ..Default::default()
        };
        let result = FleetStatusEngine::builder().simulated(&config, ScriptedSource::constant(0.0));
        assert!(matches!(result, Err(FleetError::Config(_))));
    }

    #[test]
    fn test_safe_to_danger_notifies_once() {
        let clock = Arc::new(ManualClock::at_epoch());
        let feed = ControlRoomFeed::default();
        let mut rx = feed.subscribe();
        let mut engine = scripted_engine(&[0.0, 0.99], clock.clone(), Arc::new(feed));
        let mut roster = roster_with(DriverStatus::Safe);

        let report = engine.tick(&mut roster);

        let record = roster.get("1").unwrap();
        assert_eq!(record.status(), DriverStatus::Danger);
        assert_eq!(record.alert_count(), 1);
        assert_eq!(record.last_alert_at(), Some(clock.now()));
        assert_eq!(report.critical.len(), 1);

        let transition = rx.try_recv().unwrap();
        assert_eq!(transition.driver_id, "1");
        assert_eq!(transition.name, "John Smith");
        assert_eq!(transition.vehicle_id, "TR-001");
        assert_eq!(transition.timestamp, clock.now());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_danger_to_danger_is_not_critical() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = scripted_engine(&[0.0, 0.99], clock.clone(), Arc::new(ControlRoomFeed::default()));
        let mut roster = roster_with(DriverStatus::Danger);

        clock.advance(Duration::from_secs(5));
        let report = engine.tick(&mut roster);

        let record = roster.get("1").unwrap();
        assert!(report.critical.is_empty());
        assert_eq!(record.alert_count(), 0);
        assert_eq!(record.last_alert_at(), Some(clock.now()));
    }

    #[test]
    fn test_warning_stamps_without_counting() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = scripted_engine(&[0.0, 0.5], clock.clone(), Arc::new(SilentControlRoom));
        let mut roster = roster_with(DriverStatus::Safe);

        engine.tick(&mut roster);
        let record = roster.get("1").unwrap();
        assert_eq!(record.status(), DriverStatus::Warning);
        assert_eq!(record.alert_count(), 0);
        assert_eq!(record.last_alert_at(), Some(clock.now()));
    }

    #[test]
    fn test_safe_keeps_last_alert() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = scripted_engine(&[0.0, 0.99, 0.0, 0.1], clock.clone(), Arc::new(SilentControlRoom));
        let mut roster = roster_with(DriverStatus::Safe);

        engine.tick(&mut roster);
        let stamped = roster.get("1").unwrap().last_alert_at();

        clock.advance(Duration::from_secs(5));
        engine.tick(&mut roster);
        let record = roster.get("1").unwrap();
        assert_eq!(record.status(), DriverStatus::Safe);
        assert_eq!(record.last_alert_at(), stamped);
        assert_eq!(record.alert_count(), 1);
    }

    #[test]
    fn test_no_change_above_probability() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = scripted_engine(&[0.05], clock, Arc::new(SilentControlRoom));
        let mut roster = roster_with(DriverStatus::Warning);
        let before = roster.get("1").cloned();

        let report = engine.tick(&mut roster);
        assert_eq!(report, TickReport::default());
        assert_eq!(roster.get("1").cloned(), before);
    }

    #[test]
    fn test_empty_roster_tick() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = scripted_engine(&[0.0], clock, Arc::new(SilentControlRoom));
        let mut roster = FleetRoster::new(Vec::new()).unwrap();
        assert_eq!(engine.tick(&mut roster), TickReport::default());
    }

    #[test]
    fn test_change_rate_and_alert_accounting() {
        let clock = Arc::new(ManualClock::at_epoch());
        let mut engine = FleetStatusEngine::builder()
            .clock(clock)
            .simulated(&FleetConfig::default(), RngSource::seeded(2024))
            .unwrap()
            .build()
            .unwrap();
        let epoch = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        let mut roster = FleetRoster::new(FleetRoster::demo_registrations(epoch)).unwrap();

        let trials = 10_000;
        let mut replaced = 0;
        let mut critical = 0;
        let mut visible = 0;
        let mut danger_entries = vec![0u32; roster.len()];
        for _ in 0..trials {
            let before: Vec<DriverStatus> = roster.iter().map(|r| r.status()).collect();
            let report = engine.tick(&mut roster);
            replaced += report.replaced;
            critical += report.critical.len();
            for (i, record) in roster.iter().enumerate() {
                if record.status() != before[i] {
                    visible += 1;
                }
                if record.status() == DriverStatus::Danger && before[i] != DriverStatus::Danger {
                    danger_entries[i] += 1;
                }
            }
        }

        let rate = replaced as f64 / (trials * roster.len()) as f64;
        assert!((rate - 0.05).abs() < 0.005, "change rate {}", rate);
        // a third of replacements re-draw the current status
        let visible_rate = visible as f64 / (trials * roster.len()) as f64;
        assert!((visible_rate - 0.05 * 2.0 / 3.0).abs() < 0.005, "visible rate {}", visible_rate);

        let initial = [0, 2, 5, 1];
        for (i, record) in roster.iter().enumerate() {
            assert_eq!(record.alert_count(), initial[i] + danger_entries[i]);
        }
        assert_eq!(critical as u32, danger_entries.iter().sum::<u32>());
    }

    struct SilentControlRoom;

    impl ControlRoomNotifier for SilentControlRoom {
        fn on_critical_transition(&self, _transition: &CriticalTransition) {}
    }
}
