//! Scan document ingestion: turns the scanner's output directory into
//! [`HostRecord`]s.
//!
//! Documents are processed one at a time. A document that cannot be read or
//! parsed is logged and skipped without affecting the others, and a host
//! without an address is logged and skipped without affecting its document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use netsweep_core::config::ScannerSettings;
use netsweep_core::HostRecord;

use crate::error::{DiscoverError, Result};
use crate::nmap_xml;
use crate::pipeline::ResultSource;

/// Subnet tag encoded in a document's file name: the two characters just
/// before the extension (`scan-24.xml` → `24`).
///
/// Purely positional. Nothing is parsed as a number.
pub fn subnet_tag(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < 2 {
        return None;
    }
    Some(chars[chars.len() - 2..].iter().collect())
}

/// The directory the scanner writes its documents into.
pub struct ScanDirectory {
    dir: PathBuf,
    extension: String,
}

impl ScanDirectory {
    pub fn new(settings: &ScannerSettings) -> Self {
        Self {
            dir: settings.scan_dir.clone(),
            extension: settings.extension.clone(),
        }
    }

    /// Documents with the configured extension, sorted by file name.
    pub async fn documents(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut documents = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension);
            // Follows symlinks, so linked documents are read too.
            if matches && tokio::fs::metadata(&path).await?.is_file() {
                documents.push(path);
            }
        }

        documents.sort();
        Ok(documents)
    }

    /// Extract every addressable host from one document.
    pub async fn parse_document(&self, path: &Path) -> Result<Vec<HostRecord>> {
        let subnet = subnet_tag(path).ok_or_else(|| DiscoverError::MissingSubnetTag {
            path: path.to_path_buf(),
        })?;
        let xml = tokio::fs::read(path).await?;
        let hosts = nmap_xml::parse_nmap_xml(&xml)?;

        let mut records = Vec::with_capacity(hosts.len());
        for (index, host) in hosts.iter().enumerate() {
            let Some(address) = host.ipv4() else {
                tracing::warn!(
                    path = %path.display(),
                    host_index = index,
                    "Host has no address, skipping"
                );
                continue;
            };

            records.push(HostRecord {
                address: address.to_string(),
                subnet: subnet.clone(),
                os_name: host.os_description(),
                state: host.state().map(String::from),
            });
        }

        Ok(records)
    }
}

#[async_trait]
impl ResultSource for ScanDirectory {
    async fn parse_results(&self) -> Vec<HostRecord> {
        let documents = match self.documents().await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to list scan documents"
                );
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for path in &documents {
            match self.parse_document(path).await {
                Ok(found) => {
                    tracing::debug!(path = %path.display(), hosts = found.len(), "Parsed scan document");
                    records.extend(found);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to parse scan document");
                }
            }
        }

        tracing::info!(
            documents = documents.len(),
            hosts = records.len(),
            "Extracted hosts from scan documents"
        );
        records
    }
}
