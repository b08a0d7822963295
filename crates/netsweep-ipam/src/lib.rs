//! netsweep-ipam: REST client for the IPAM service.
//!
//! Reads prefixes tagged for discovery and creates address records for the
//! hosts a scan found. The pipeline only sees the two traits below, so tests
//! can swap the HTTP client for an in-memory fake.

pub mod client;
pub mod mutations;
pub mod queries;

use async_trait::async_trait;
use netsweep_core::{HostRecord, Prefix};

pub use client::{IpamClient, IpamError};
pub use mutations::{AddressPayload, PublishSummary};

/// Source of prefixes to scan.
#[async_trait]
pub trait PrefixSource: Send + Sync {
    /// Prefixes carrying the discovery tag.
    ///
    /// Errors are logged by the implementation; callers treat them as
    /// "nothing to do".
    async fn fetch_discoverable_prefixes(&self) -> Result<Vec<Prefix>, IpamError>;
}

/// Destination for extracted hosts.
#[async_trait]
pub trait AddressSink: Send + Sync {
    /// Publish every record, continuing past individual failures.
    async fn publish(&self, records: &[HostRecord]) -> PublishSummary;
}
