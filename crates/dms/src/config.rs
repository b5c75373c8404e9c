//! Sampler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DmsError;

/// Eye-state sampler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Interval between observations (milliseconds)
    pub tick_interval_ms: u64,

    /// Variates below this are classified drowsy
    pub drowsy_threshold: f64,

    /// Variates below this (and not drowsy) are classified closed
    pub closed_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            drowsy_threshold: 0.10,
            closed_threshold: 0.30,
        }
    }
}

impl SamplerConfig {
    /// Tick interval as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check thresholds are cumulative and inside `[0, 1]`
    pub fn validate(&self) -> Result<(), DmsError> {
        if !(0.0..=1.0).contains(&self.drowsy_threshold)
            || !(0.0..=1.0).contains(&self.closed_threshold)
        {
            return Err(DmsError::Config(format!(
                "thresholds must lie in [0, 1] (drowsy {}, closed {})",
                self.drowsy_threshold, self.closed_threshold
            )));
        }
        if self.drowsy_threshold > self.closed_threshold {
            return Err(DmsError::Config(format!(
                "drowsy threshold {} exceeds closed threshold {}",
                self.drowsy_threshold, self.closed_threshold
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(DmsError::Config("tick interval must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SamplerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = SamplerConfig {
            drowsy_threshold: 0.5,
            closed_threshold: 0.3,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = SamplerConfig {
            closed_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
