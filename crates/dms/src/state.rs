//! Eye state and observations

use serde::{Deserialize, Serialize};

/// Classified eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeState {
    #[default]
    Open,
    Closed,
    Drowsy,
}

/// Risk level shown for an eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeRisk {
    Safe,
    Warning,
    Danger,
}

impl EyeState {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeState::Open => "open",
            EyeState::Closed => "closed",
            EyeState::Drowsy => "drowsy",
        }
    }

    /// Risk level for display
    pub fn risk(&self) -> EyeRisk {
        match self {
            EyeState::Drowsy => EyeRisk::Danger,
            EyeState::Closed => EyeRisk::Warning,
            EyeState::Open => EyeRisk::Safe,
        }
    }

    /// Operator-facing status line
    pub fn status_label(&self) -> &'static str {
        match self {
            EyeState::Drowsy => "DROWSY DETECTED",
            EyeState::Closed => "Eyes Closed",
            EyeState::Open => "Alert & Active",
        }
    }
}

impl std::fmt::Display for EyeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete event raised by an observation.
///
/// Events drive alerting; the displayed state is just the last
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationEvent {
    /// Driver showing signs of drowsiness
    Drowsy,
    /// Baseline telemetry; never clears alerts
    Normal,
}

/// Result of one sampling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Classified state
    pub state: EyeState,
    /// Event for the caller, if the state raises one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ObservationEvent>,
}

impl Observation {
    /// Build the observation for a classified state
    pub fn from_state(state: EyeState) -> Self {
        let event = match state {
            EyeState::Drowsy => Some(ObservationEvent::Drowsy),
            EyeState::Open => Some(ObservationEvent::Normal),
            EyeState::Closed => None,
        };
        Self { state, event }
    }

    /// Whether this observation should raise an alert
    pub fn is_drowsy(&self) -> bool {
        self.event == Some(ObservationEvent::Drowsy)
    }
}
