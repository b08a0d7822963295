//! Error types for the netsweep-discover crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Failed to start scanner `{command}`: {source}")]
    ScannerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scanner exited with code {code}: {stderr}")]
    ScannerFailed { code: i32, stderr: String },

    #[error("No scans completed ({attempted} attempted)")]
    NoScansCompleted { attempted: usize },

    #[error("Failed to parse scan document: {0}")]
    XmlParse(String),

    #[error("Cannot derive a subnet tag from {}", path.display())]
    MissingSubnetTag { path: PathBuf },

    #[error("Failed to start archiver `{command}`: {source}")]
    ArchiveSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging setup failed: {0}")]
    Telemetry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
