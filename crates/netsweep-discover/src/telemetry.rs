//! Logging setup.
//!
//! Events are emitted as JSON lines to stdout and, when `logging.file` is
//! set, appended to that file as well. The level filter comes from
//! `RUST_LOG` (default `info`).

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

use netsweep_core::config::LoggingSettings;

use crate::error::{DiscoverError, Result};

/// Build the subscriber without installing it.
pub fn build_subscriber(
    settings: &LoggingSettings,
    filter: EnvFilter,
) -> Result<impl Subscriber + Send + Sync> {
    let writer = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(std::io::stdout.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    Ok(fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(writer)
        .finish())
}

/// Install the process-wide subscriber.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = build_subscriber(settings, filter)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| DiscoverError::Telemetry(e.to_string()))
}
