//! Alert Aggregator Implementation

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{Alert, AlertId, AlertKind, AlertNotifier, NullNotifier};

/// Aggregator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Size of the recent-history window (default: 5)
    pub recent_window: usize,
    /// Maximum alerts retained; oldest insertions are evicted first
    pub history_capacity: usize,
    /// Initial sound setting
    pub sound_enabled: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            recent_window: 5,
            history_capacity: 100,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion sequence, breaks timestamp ties
    seq: u64,
    alert: Alert,
}

/// Per-session alert history and active-alert selection.
///
/// The active alert is the urgent alert (`kind != Normal`, `severity ==
/// High`) with the latest `created_at`, ties going to the most recent
/// insertion. It is recomputed inside every mutation, so readers never see
/// history and active alert out of step.
pub struct AlertAggregator {
    /// Configuration
    config: AggregatorConfig,
    /// History, newest insertion at the front
    entries: VecDeque<Entry>,
    /// Next insertion sequence
    next_seq: u64,
    /// Identity of the active alert
    active: Option<AlertId>,
    /// Whether the notifier should sound alerts
    sound_enabled: bool,
    /// Notification collaborator
    notifier: Arc<dyn AlertNotifier>,
}

impl AlertAggregator {
    /// Create an aggregator reporting to `notifier`
    pub fn new(config: AggregatorConfig, notifier: Arc<dyn AlertNotifier>) -> Self {
        debug!("Creating alert aggregator with config: {:?}", config);
        Self {
            sound_enabled: config.sound_enabled,
            entries: VecDeque::with_capacity(config.history_capacity.min(1024)),
            config,
            next_seq: 0,
            active: None,
            notifier,
        }
    }

    /// Record a new alert
    pub fn record(&mut self, alert: Alert) {
        info!(
            "Alert recorded: {:?} for {} ({})",
            alert.kind(),
            alert.driver_name(),
            alert.vehicle_id()
        );
        metrics::counter!("driveguard_alerts_recorded_total").increment(1);

        self.entries.push_front(Entry {
            seq: self.next_seq,
            alert,
        });
        self.next_seq += 1;

        let capacity = self.config.history_capacity.max(1);
        while self.entries.len() > capacity {
            if let Some(evicted) = self.entries.pop_back() {
                warn!("Alert history full, evicting {}", evicted.alert.id());
            }
        }

        self.refresh_active();
    }

    /// Remove an alert from history. Unknown ids are ignored.
    ///
    /// Returns whether an alert was removed.
    pub fn acknowledge(&mut self, id: AlertId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.alert.id() == id) else {
            debug!("Acknowledge ignored: alert {} not in history", id);
            return false;
        };

        self.entries.remove(index);
        info!("Alert acknowledged: {}", id);
        metrics::counter!("driveguard_alerts_acknowledged_total").increment(1);

        if self.active == Some(id) {
            self.refresh_active();
        }
        true
    }

    /// At most `n` most recent non-normal alerts, newest first
    pub fn recent_history(&self, n: usize) -> Vec<&Alert> {
        let mut recent: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.alert.kind() != AlertKind::Normal)
            .collect();

        // entries are already in descending insertion order; the stable
        // sort keeps that order among equal timestamps
        recent.sort_by(|a, b| b.alert.created_at().cmp(&a.alert.created_at()));
        recent.into_iter().take(n).map(|e| &e.alert).collect()
    }

    /// Recent history using the configured window
    pub fn recent(&self) -> Vec<&Alert> {
        self.recent_history(self.config.recent_window)
    }

    /// Current active alert
    pub fn active_alert(&self) -> Option<&Alert> {
        let id = self.active?;
        self.entries
            .iter()
            .map(|e| &e.alert)
            .find(|alert| alert.id() == id)
    }

    /// Full history, newest insertion first
    pub fn history(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter().map(|e| &e.alert)
    }

    /// Number of alerts retained
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.refresh_active();
    }

    /// Whether alerts should be sounded
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Enable or mute alert sound
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        if self.sound_enabled != enabled {
            self.sound_enabled = enabled;
            self.notifier.on_sound_toggled(enabled);
        }
    }

    /// Flip the sound setting, returning the new value
    pub fn toggle_sound(&mut self) -> bool {
        self.set_sound_enabled(!self.sound_enabled);
        self.sound_enabled
    }

    /// Active configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    fn refresh_active(&mut self) {
        let next = self
            .entries
            .iter()
            .filter(|e| e.alert.is_urgent())
            .max_by_key(|e| (e.alert.created_at(), e.seq))
            .map(|e| e.alert.id());

        if next != self.active {
            self.active = next;
            self.notifier
                .on_active_alert_changed(self.active_alert(), self.sound_enabled);
        }
    }
}

impl Default for AlertAggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default(), Arc::new(NullNotifier))
    }
}

impl std::fmt::Debug for AlertAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertAggregator")
            .field("config", &self.config)
            .field("len", &self.entries.len())
            .field("active", &self.active)
            .field("sound_enabled", &self.sound_enabled)
            .finish()
    }
}
