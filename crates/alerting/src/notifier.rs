//! Notification collaborator

use tracing::{debug, info};

use crate::Alert;

/// Receives active-alert changes. Decides how to alert, never whether.
pub trait AlertNotifier: Send + Sync {
    /// Active alert changed (`None` when no alert is active)
    fn on_active_alert_changed(&self, alert: Option<&Alert>, sound_enabled: bool);

    /// Operator toggled sound
    fn on_sound_toggled(&self, _enabled: bool) {}
}

/// Discards all notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl AlertNotifier for NullNotifier {
    fn on_active_alert_changed(&self, _alert: Option<&Alert>, _sound_enabled: bool) {}
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl AlertNotifier for LoggingNotifier {
    fn on_active_alert_changed(&self, alert: Option<&Alert>, sound_enabled: bool) {
        match alert {
            Some(alert) if sound_enabled => info!(
                "{} (sound): {} | {} at {}",
                alert.title(),
                alert.driver_name(),
                alert.vehicle_id(),
                alert.created_at().format("%H:%M:%S")
            ),
            Some(alert) => info!(
                "{} (muted): {} | {} at {}",
                alert.title(),
                alert.driver_name(),
                alert.vehicle_id(),
                alert.created_at().format("%H:%M:%S")
            ),
            None => debug!("No active alert"),
        }
    }

    fn on_sound_toggled(&self, enabled: bool) {
        info!("Alert sound {}", if enabled { "enabled" } else { "muted" });
    }
}
