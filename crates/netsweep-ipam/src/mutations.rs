//! Write operations: creating address records for discovered hosts.
//!
//! A record counts as submitted only when IPAM answers 2xx. Rejections are
//! logged with the response body and counted as failures.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use netsweep_core::config::PublishSettings;
use netsweep_core::HostRecord;

use crate::client::{IpamClient, IpamError};
use crate::AddressSink;

pub const ADDRESSES_PATH: &str = "/api/ipam/ip-addresses/";

/// Body of `POST /api/ipam/ip-addresses/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddressPayload {
    pub address: String,
    pub status: String,
    pub description: String,
    pub custom_fields: BTreeMap<String, String>,
}

impl AddressPayload {
    pub fn from_record(record: &HostRecord, settings: &PublishSettings) -> Self {
        let mut custom_fields = BTreeMap::new();
        custom_fields.insert(settings.custom_field.clone(), record.os_name.clone());

        Self {
            address: record.cidr(),
            status: settings.status.clone(),
            description: settings.description.clone(),
            custom_fields,
        }
    }
}

/// Outcome of a publish pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub submitted: usize,
    pub failed: usize,
}

impl IpamClient {
    /// Create a single address record.
    pub async fn create_address(&self, record: &HostRecord) -> Result<(), IpamError> {
        let payload = AddressPayload::from_record(record, &self.publish);
        let response = self
            .http
            .post(self.endpoint(ADDRESSES_PATH))
            .json(&payload)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AddressSink for IpamClient {
    async fn publish(&self, records: &[HostRecord]) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for record in records {
            match self.create_address(record).await {
                Ok(()) => {
                    summary.submitted += 1;
                    tracing::debug!(address = %record.cidr(), "Address created");
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(address = %record.cidr(), error = %e, "Failed to create address");
                }
            }
        }

        tracing::info!(
            submitted = summary.submitted,
            failed = summary.failed,
            "Published discovered hosts"
        );
        summary
    }
}
