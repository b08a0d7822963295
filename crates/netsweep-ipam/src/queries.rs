//! Read operations: the prefix listing and discovery-tag filtering.

use async_trait::async_trait;
use serde::Deserialize;

use netsweep_core::Prefix;

use crate::client::{IpamClient, IpamError};
use crate::PrefixSource;

pub const PREFIXES_PATH: &str = "/api/ipam/prefixes/";

/// Body of `GET /api/ipam/prefixes/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefixListing {
    pub results: Vec<PrefixEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrefixEntry {
    pub prefix: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl PrefixEntry {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}

impl PrefixListing {
    /// Prefixes carrying `tag`, in listing order.
    pub fn tagged(&self, tag: &str) -> Vec<Prefix> {
        self.results
            .iter()
            .filter(|entry| entry.has_tag(tag))
            .map(|entry| Prefix(entry.prefix.clone()))
            .collect()
    }
}

impl IpamClient {
    async fn list_prefixes(&self) -> Result<PrefixListing, IpamError> {
        let response = self.http.get(self.endpoint(PREFIXES_PATH)).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| IpamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PrefixSource for IpamClient {
    async fn fetch_discoverable_prefixes(&self) -> Result<Vec<Prefix>, IpamError> {
        let listing = match self.list_prefixes().await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch prefixes from IPAM");
                return Err(e);
            }
        };

        let prefixes = listing.tagged(&self.discovery_tag);
        let names: Vec<&str> = prefixes.iter().map(Prefix::as_str).collect();
        tracing::info!(
            tag = %self.discovery_tag,
            listed = listing.results.len(),
            count = prefixes.len(),
            prefixes = ?names,
            "Resolved discoverable prefixes"
        );

        Ok(prefixes)
    }
}
