//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventDesk application.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::models::RegistrationStatus;
use crate::utils::errors::{EventDeskError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EventDeskError::Config(format!("Invalid log filter: {}", e)))?;
    let json = config.format == "json";

    let stdout_layer = if json {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "eventdesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = if json {
                fmt::layer().json().with_ansi(false).with_writer(non_blocking).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(non_blocking).boxed()
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EventDeskError::Config(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a registration state change
pub fn log_registration_action(event_id: i64, registration_id: i64, action: &str, status: RegistrationStatus) {
    info!(
        event_id = event_id,
        registration_id = registration_id,
        action = action,
        status = %status,
        "Registration action performed"
    );
}

/// Log a capacity counter change
pub fn log_capacity_change(event_id: i64, action: &str, current: i32, max: Option<i32>) {
    debug!(
        event_id = event_id,
        action = action,
        current_participants = current,
        max_participants = max,
        "Capacity updated"
    );
}

/// Log admin actions against events
pub fn log_admin_action(event_id: i64, action: &str, details: Option<&str>) {
    warn!(
        event_id = event_id,
        action = action,
        details = details,
        "Admin action performed"
    );
}

/// Log rejected submissions
pub fn log_validation_failure(event_id: i64, fields: &[String], message: &str) {
    warn!(
        event_id = event_id,
        fields = ?fields,
        message = message,
        "Submission rejected"
    );
}
