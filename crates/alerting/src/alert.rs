//! Alert records and the alert factory

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use timing::{Clock, Timestamp};
use tracing::debug;
use uuid::Uuid;

/// Unique alert identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Drowsy,
    Fatigue,
    Normal,
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Anything an alert can be raised about
pub trait AlertSubject {
    fn driver_name(&self) -> &str;
    fn vehicle_id(&self) -> &str;
}

/// Immutable alert record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    id: AlertId,
    kind: AlertKind,
    created_at: Timestamp,
    driver_name: String,
    vehicle_id: String,
    severity: Severity,
}

impl Alert {
    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether this alert can become the active alert
    pub fn is_urgent(&self) -> bool {
        self.kind != AlertKind::Normal && self.severity == Severity::High
    }

    /// Operator-facing title
    pub fn title(&self) -> &'static str {
        match self.kind {
            AlertKind::Drowsy => "Drowsiness Detected",
            AlertKind::Fatigue => "Fatigue Alert",
            AlertKind::Normal => "Normal",
        }
    }
}

/// Creates alerts stamped by the injected clock
#[derive(Clone)]
pub struct AlertFactory {
    clock: Arc<dyn Clock>,
}

impl AlertFactory {
    /// Create a factory using `clock` for timestamps
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Alert for a drowsy observation: always `Drowsy` / `High`
    pub fn create_alert(&self, subject: &impl AlertSubject) -> Alert {
        self.create(subject, AlertKind::Drowsy, Severity::High)
    }

    /// Alert of an arbitrary kind and severity
    pub fn create(&self, subject: &impl AlertSubject, kind: AlertKind, severity: Severity) -> Alert {
        let alert = Alert {
            id: AlertId::new(),
            kind,
            created_at: self.clock.now(),
            driver_name: subject.driver_name().to_string(),
            vehicle_id: subject.vehicle_id().to_string(),
            severity,
        };
        debug!(
            "Created {:?}/{:?} alert {} for {} ({})",
            kind, severity, alert.id, alert.driver_name, alert.vehicle_id
        );
        alert
    }
}

impl std::fmt::Debug for AlertFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertFactory").finish_non_exhaustive()
    }
}
