//! DriveGuard Simulator - Main Entry Point

use simulator::{init_logging, init_metrics, run, SimulatorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1);
    let config = SimulatorConfig::load(config_path.as_deref())?;

    init_logging(&config.log_level)?;
    init_metrics(config.metrics_addr.as_deref())?;

    info!("=== DriveGuard Simulator v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting fleet fatigue monitoring...");

    run(config).await
}
