use std::{fs::OpenOptions, path::PathBuf};

use color_eyre::eyre::Result;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use eth_transfers::config::get_data_dir;

const LOG_FILE: &str = "eth-transfers.log";

/// Log file for a network, kept next to that network's store.
pub fn log_path(network: &str) -> PathBuf {
    get_data_dir().join(network).join(LOG_FILE)
}

/// Append this run's log to the network's log file.
pub fn init(network: &str) -> Result<()> {
    let log_path = log_path(network);
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    // Each subcommand is a separate run; keep earlier runs' history
    let log_file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env().add_directive("eth_transfers=debug".parse()?));

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    info!(network, pid = std::process::id(), "Session log started");
    Ok(())
}

/// Text carried by a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    match payload.downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match payload.downcast_ref::<String>() {
            Some(s) => s.as_str(),
            None => "unknown panic payload",
        },
    }
}

/// Log a panic message and location.
pub fn log_panic(panic: &std::panic::PanicHookInfo) {
    let location = panic.location().map_or_else(
        || "unknown location".to_string(),
        |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
    );

    error!("Panic occurred: {} at {}", panic_message(panic.payload()), location);
}
