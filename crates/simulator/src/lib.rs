//! DriveGuard Simulator
//!
//! Wires a monitored driver session and the control-room fleet view
//! together on one tokio runtime.

use alerting::{Alert, LoggingNotifier};
use dms::SimulatedEyeDetector;
use driver_session::{DriverSession, SessionController, SessionRunner};
use fleet::{
    ControlRoomFeed, ControlRoomNotifier, FleetMonitor, FleetRoster, FleetStatusEngine,
    FleetSummary, LoggingControlRoom,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use timing::{Clock, RandomSource, RngSource, SystemClock};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod settings;

pub use settings::SimulatorConfig;

/// State logged when the simulation shuts down
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub fleet: FleetSummary,
    pub roster: FleetRoster,
    pub session: DriverSession,
    /// Operator-facing eye status line
    pub eye_status: &'static str,
    pub recent_alerts: Vec<Alert>,
}

/// Initialize logging
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let level: Level = level.parse()?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install the Prometheus exporter when an address is configured
pub fn init_metrics(addr: Option<&str>) -> anyhow::Result<()> {
    let Some(addr) = addr else {
        return Ok(());
    };
    let addr: SocketAddr = addr.parse()?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Independent variate stream per component
fn random_source(seed: Option<u64>, stream: u64) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(RngSource::seeded(seed.wrapping_add(stream))),
        None => Box::new(RngSource::from_entropy()),
    }
}

/// Build the fleet monitor and its control-room feed
pub fn build_fleet(
    config: &SimulatorConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<(FleetMonitor, ControlRoomFeed)> {
    let registrations = if config.roster.is_empty() {
        FleetRoster::demo_registrations(clock.now())
    } else {
        config.roster.clone()
    };
    let roster = FleetRoster::new(registrations)?;

    let feed = ControlRoomFeed::default();
    let engine = FleetStatusEngine::builder()
        .clock(clock)
        .simulated(&config.fleet, random_source(config.seed, 1))?
        .notifier(Arc::new(feed.clone()))
        .build()?;

    Ok((
        FleetMonitor::new(engine, roster, config.fleet.tick_interval()),
        feed,
    ))
}

/// Build the runner for the configured driver
pub fn build_session(
    config: &SimulatorConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<SessionRunner> {
    let detector = SimulatedEyeDetector::builder()
        .config(config.sampler.clone())
        .random_source(random_source(config.seed, 0))
        .build()?;

    let controller = SessionController::builder()
        .check_in(config.driver.clone())
        .detector(detector)
        .clock(clock)
        .aggregator_config(config.alerts.clone())
        .notifier(Arc::new(LoggingNotifier))
        .sample_interval(config.sampler.tick_interval())
        .build()?;

    Ok(SessionRunner::new(controller))
}

/// Run the simulation until the configured duration elapses or Ctrl-C
pub async fn run(config: SimulatorConfig) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let (mut fleet, feed) = build_fleet(&config, Arc::clone(&clock))?;
    let mut control_room = feed.subscribe();
    let feed_task = tokio::spawn(async move {
        loop {
            match control_room.recv().await {
                Ok(transition) => LoggingControlRoom.on_critical_transition(&transition),
                Err(RecvError::Lagged(missed)) => {
                    warn!("Control room lagged, {} transitions dropped", missed)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut session = build_session(&config, clock)?;
    session.start();
    fleet.start();

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(config.run_seconds)) => {
            info!("Simulation finished after {}s", config.run_seconds);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    let snapshot = snapshot(&fleet, &session);
    info!("Final state:\n{}", serde_json::to_string_pretty(&snapshot)?);

    fleet.teardown();
    session.end_session();
    feed_task.abort();
    Ok(())
}

/// Capture fleet and session state
pub fn snapshot(fleet: &FleetMonitor, session: &SessionRunner) -> Snapshot {
    let (summary, roster) = fleet.with_roster(|roster| (roster.summary(), roster.clone()));
    let (session, eye_status, recent_alerts) = session.with(|controller| {
        (
            controller.session().clone(),
            controller.eye_state().status_label(),
            controller.recent().into_iter().cloned().collect::<Vec<_>>(),
        )
    });

    Snapshot {
        fleet: summary,
        roster,
        session,
        eye_status,
        recent_alerts,
    }
}
