//! Scanner process wrapper.
//!
//! Runs the configured scanner once per prefix via `tokio::process::Command`,
//! one at a time. The scanner writes its documents into the scan directory
//! itself; only the exit status is used here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use netsweep_core::config::ScannerSettings;
use netsweep_core::Prefix;

use crate::error::{DiscoverError, Result};
use crate::pipeline::ScanRunner;

/// Result of one successful scanner invocation.
#[derive(Debug)]
pub struct ScanOutput {
    pub prefix: Prefix,
    pub stdout: String,
    pub duration: Duration,
}

/// Wrapper around the scanner executable.
pub struct NmapScanner {
    command: String,
    args: Vec<String>,
}

impl NmapScanner {
    pub fn new(settings: &ScannerSettings) -> Self {
        Self {
            command: settings.script_name.clone(),
            args: settings.args.clone(),
        }
    }

    /// Scan one prefix: `<command> [args...] <prefix>`.
    ///
    /// Succeeds only if the process exits with code 0.
    pub async fn scan(&self, prefix: &Prefix) -> Result<ScanOutput> {
        let start = Instant::now();
        tracing::info!(prefix = %prefix, "Starting scan");

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(prefix.as_str())
            .output()
            .await
            .map_err(|source| DiscoverError::ScannerSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DiscoverError::ScannerFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(ScanOutput {
            prefix: prefix.clone(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            duration: start.elapsed(),
        })
    }
}

#[async_trait]
impl ScanRunner for NmapScanner {
    async fn run_scans(&self, prefixes: &[Prefix]) -> Result<Vec<Prefix>> {
        let mut completed = Vec::with_capacity(prefixes.len());

        for prefix in prefixes {
            match self.scan(prefix).await {
                Ok(output) => {
                    tracing::info!(
                        prefix = %output.prefix,
                        duration_ms = output.duration.as_millis(),
                        "Scan complete"
                    );
                    tracing::debug!(prefix = %output.prefix, stdout = %output.stdout, "Scanner output");
                    completed.push(output.prefix);
                }
                Err(DiscoverError::ScannerFailed { code, stderr }) => {
                    tracing::error!(prefix = %prefix, exit_code = code, stderr = %stderr, "Scan failed");
                }
                Err(e) => {
                    tracing::error!(prefix = %prefix, error = %e, "Scan failed");
                }
            }
        }

        if completed.is_empty() {
            tracing::error!(attempted = prefixes.len(), "No scans completed");
            return Err(DiscoverError::NoScansCompleted {
                attempted: prefixes.len(),
            });
        }

        tracing::info!(
            attempted = prefixes.len(),
            completed = completed.len(),
            "Scans finished"
        );
        Ok(completed)
    }
}
