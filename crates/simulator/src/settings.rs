//! Simulator settings

use alerting::AggregatorConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use dms::SamplerConfig;
use driver_session::CheckIn;
use fleet::{DriverRegistration, FleetConfig};
use serde::{Deserialize, Serialize};

/// Top-level simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Seed for reproducible runs; OS entropy when unset
    pub seed: Option<u64>,
    /// How long to simulate before shutting down (seconds)
    pub run_seconds: u64,
    /// Prometheus listen address, e.g. "0.0.0.0:9000"
    pub metrics_addr: Option<String>,
    pub sampler: SamplerConfig,
    pub alerts: AggregatorConfig,
    pub fleet: FleetConfig,
    /// Control-room roster; the demo roster is used when empty
    pub roster: Vec<DriverRegistration>,
    /// Driver checked in at startup
    pub driver: CheckIn,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
            run_seconds: 60,
            metrics_addr: None,
            sampler: SamplerConfig::default(),
            alerts: AggregatorConfig::default(),
            fleet: FleetConfig::default(),
            roster: Vec::new(),
            driver: CheckIn {
                name: "John Smith".to_string(),
                vehicle_id: "TR-001".to_string(),
                shift_start: "06:00".to_string(),
                last_break: String::new(),
            },
        }
    }
}

impl SimulatorConfig {
    /// Load from `path` (or an optional `driveguard.toml`), then
    /// `DRIVEGUARD__*` environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name("driveguard").required(false),
        };
        Self::from_builder(Config::builder().add_source(file))
    }

    pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("DRIVEGUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
