//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Remindr backend.

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard owns the file-appender worker; the caller must hold it
/// for the process lifetime or buffered log lines are lost on exit.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "remindr.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log dispatcher status updates
pub fn log_dispatch_update(reminder_id: uuid::Uuid, status: &str) {
    info!(
        reminder_id = %reminder_id,
        status = status,
        "Dispatcher status update applied"
    );
}
