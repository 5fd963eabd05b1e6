//! Logging Infrastructure
//!
//! Structured logging via `tracing`. `RUST_LOG` wins over the configured
//! level when set. With a log directory, output goes to a daily rolling
//! file instead of stdout.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with the default level
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON formatting and file output
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let result = match log_dir {
        Some(dir) if dir.is_dir() => {
            let file_appender = tracing_appender::rolling::daily(dir, "bookhaul-server.log");
            let builder = builder.with_writer(file_appender).with_ansi(false);
            if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        _ => {
            if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
    };

    if let Err(e) = result {
        tracing::debug!("Logger already initialized: {}", e);
    }
}
