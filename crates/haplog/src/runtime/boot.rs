//! Boot — logging init and config load.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::HaplogConfig;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout carries the decoded records.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haplog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate config. Command line arguments, when given, replace
/// the configured inputs.
pub fn boot() -> Result<HaplogConfig, Box<dyn std::error::Error>> {
    info!("Starting haplog v{}", env!("CARGO_PKG_VERSION"));

    let mut config = HaplogConfig::load()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        config.inputs = args;
    }

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        "Loaded configuration: timezone={}, inputs={}, fail_fast={}, emit_partial={}",
        config.timezone,
        if config.inputs.is_empty() {
            "stdin".to_string()
        } else {
            config.inputs.join(",")
        },
        config.fail_fast,
        config.emit_partial
    );

    Ok(config)
}
