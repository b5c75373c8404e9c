//! Eye-state detectors

use timing::RandomSource;
use tracing::{debug, info};

use crate::{DmsError, EyeState, Observation, SamplerConfig};

/// Capability producing one eye-state observation per call.
///
/// The session controller only sees this trait, so a camera-backed
/// detector can replace the simulation without touching alerting.
pub trait EyeStateDetector: Send {
    /// Take one observation
    fn sample(&mut self) -> Observation;

    /// Detector name for logs
    fn name(&self) -> &str {
        "detector"
    }
}

impl<T: EyeStateDetector + ?Sized> EyeStateDetector for Box<T> {
    fn sample(&mut self) -> Observation {
        (**self).sample()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Stochastic stand-in for a real eye-state model.
///
/// Thresholds are cumulative: a variate below `drowsy_threshold` is drowsy,
/// below `closed_threshold` closed, anything else open.
pub struct SimulatedEyeDetector {
    config: SamplerConfig,
    source: Box<dyn RandomSource>,
}

impl SimulatedEyeDetector {
    /// Create a detector, validating the thresholds
    pub fn new(config: SamplerConfig, source: Box<dyn RandomSource>) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            "Simulated eye detector ready (drowsy < {}, closed < {})",
            config.drowsy_threshold, config.closed_threshold
        );
        Ok(Self { config, source })
    }

    /// Start building a detector
    pub fn builder() -> SimulatedEyeDetectorBuilder {
        SimulatedEyeDetectorBuilder::default()
    }

    /// Classify a uniform variate
    pub fn classify(config: &SamplerConfig, r: f64) -> EyeState {
        if r < config.drowsy_threshold {
            EyeState::Drowsy
        } else if r < config.closed_threshold {
            EyeState::Closed
        } else {
            EyeState::Open
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl EyeStateDetector for SimulatedEyeDetector {
    fn sample(&mut self) -> Observation {
        let r = self.source.uniform();
        let state = Self::classify(&self.config, r);
        debug!("Eye sample r={:.3} -> {}", r, state);
        metrics::counter!("driveguard_eye_observations_total", "state" => state.as_str())
            .increment(1);
        Observation::from_state(state)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Builder for [`SimulatedEyeDetector`]
#[derive(Default)]
pub struct SimulatedEyeDetectorBuilder {
    config: Option<SamplerConfig>,
    source: Option<Box<dyn RandomSource>>,
}

impl SimulatedEyeDetectorBuilder {
    /// Override the default sampler configuration
    pub fn config(mut self, config: SamplerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the random source (required)
    pub fn random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the detector
    pub fn build(self) -> Result<SimulatedEyeDetector, DmsError> {
        let source = self.source.ok_or(DmsError::MissingRandomSource)?;
        SimulatedEyeDetector::new(self.config.unwrap_or_default(), source)
    }
}
