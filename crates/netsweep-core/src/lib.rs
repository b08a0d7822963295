//! netsweep-core: Shared types, settings, and error handling for netsweep.
//!
//! This crate provides the pieces every netsweep component depends on:
//! - Scan targets (`Prefix`) and extracted hosts (`HostRecord`)
//! - Settings loading from `config.toml` and `NETSWEEP__` environment variables
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::ConfigError;
pub use types::{HostRecord, Prefix, OS_NOT_DETECTED};
