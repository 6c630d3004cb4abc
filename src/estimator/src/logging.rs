use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

pub const LOG_FILE_NAME: &str = "awscalc.log";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. With `log_dir` the output
/// goes to `awscalc.log` in that directory instead of stderr.
pub fn setup_logging(default_filter: &str, log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("Invalid log filter: {}", default_filter))?;

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = RollingFileAppender::new(Rotation::NEVER, dir, LOG_FILE_NAME);

            let file_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_level(true)
                .with_timer(SystemTime)
                .with_ansi(false)
                .with_writer(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()
                .context("Failed to set tracing subscriber")?;
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_timer(SystemTime)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .context("Failed to set tracing subscriber")?;
        }
    }

    tracing::debug!("Logging system initialized");

    Ok(())
}
