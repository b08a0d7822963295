//! Archiving of finished scan documents via an external command.

use async_trait::async_trait;
use tokio::process::Command;

use netsweep_core::config::ArchiveSettings;

use crate::error::{DiscoverError, Result};
use crate::pipeline::Archiver;

/// Runs the configured archive command with no arguments.
pub struct CommandArchiver {
    command: String,
}

impl CommandArchiver {
    pub fn new(settings: &ArchiveSettings) -> Self {
        Self {
            command: settings.command.clone(),
        }
    }
}

#[async_trait]
impl Archiver for CommandArchiver {
    /// Returns the command's exit code (`-1` if killed by a signal).
    /// A non-zero code is logged, not treated as an error.
    async fn archive(&self) -> Result<i32> {
        let output = Command::new(&self.command)
            .output()
            .await
            .map_err(|source| DiscoverError::ArchiveSpawn {
                command: self.command.clone(),
                source,
            })?;

        let code = output.status.code().unwrap_or(-1);
        if output.status.success() {
            tracing::info!(command = %self.command, exit_code = code, "Scan documents archived");
        } else {
            tracing::warn!(
                command = %self.command,
                exit_code = code,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Archive command exited with non-zero status"
            );
        }

        Ok(code)
    }
}
