//! Runs the standard Circles model.
//!
//! Usage: `circles [config.json]`. Without a path the default configuration
//! is used. Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;

use circles::{CirclesConfig, Simulation, SimulationError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run() -> Result<(), SimulationError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration");
            CirclesConfig::load(path)?
        }
        None => CirclesConfig::default(),
    };
    let steps = u64::from(config.steps);

    let summary = Simulation::from_config(config).run(steps)?;
    info!(
        steps = summary.steps,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "{} drift correct",
        summary.report
    );
    Ok(())
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
