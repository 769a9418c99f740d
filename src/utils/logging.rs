//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the TradePilot dispatcher.

use tracing::{info, warn, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::models::{Plugin, UserId};
use crate::utils::errors::{TradePilotError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender when dropped and must be
/// kept alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_json = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stdout)
    });
    let stdout_plain = (!config.json).then(|| {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout)
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_json)
        .with(stdout_plain)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| TradePilotError::Config(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an incoming command and how it was routed
pub fn log_command(user_id: UserId, command: &str, decision: &str) {
    info!(
        user_id = user_id,
        command = command,
        decision = decision,
        "Command routed"
    );
}

/// Log an incoming button press
pub fn log_callback(user_id: UserId, callback_data: &str, handled: bool) {
    if handled {
        info!(user_id = user_id, callback_data = callback_data, "Callback handled");
    } else {
        warn!(user_id = user_id, callback_data = callback_data, "Callback unhandled");
    }
}

/// Log a plugin context change
pub fn log_context_change(user_id: UserId, plugin: Option<Plugin>, source_command: Option<&str>) {
    info!(
        user_id = user_id,
        plugin = plugin.map(|p| p.as_str()),
        source_command = source_command,
        "Plugin context changed"
    );
}

/// Log a wizard transition
pub fn log_flow_transition(user_id: UserId, command: &str, step: usize, transition: &str) {
    debug!(
        user_id = user_id,
        command = command,
        step = step,
        transition = transition,
        "Flow transition"
    );
}

/// Log a rejected event from a user outside the allow-list
pub fn log_access_denied(user_id: UserId, what: &str) {
    warn!(user_id = user_id, event = what, "Access denied");
}
