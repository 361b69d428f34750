//! Logging initialisation via tracing-subscriber.
//!
//! The console belongs to the story, so the default level is `warn` and
//! `[log] file` redirects everything away from the terminal.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// A `level` given on the command line (`forced = true`) beats `RUST_LOG`;
/// otherwise `RUST_LOG` wins and `level` is the fallback.
pub fn init(level: &str, forced: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = if forced {
        EnvFilter::try_new(level)
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    let writer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
                })?;
            BoxMakeWriter::new(file)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Map repeated `-v` flags to a level: `-v` info, `-vv` debug, `-vvv` trace.
pub fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}
