//! netsweep-discover: Scan IPAM prefixes and publish what was found.
//!
//! Fetches prefixes tagged for discovery from IPAM, runs the scanner over
//! each, reads the hosts out of the scanner's XML documents, creates an
//! address record per host, and archives the documents.

pub mod archive;
pub mod error;
pub mod nmap_xml;
pub mod pipeline;
pub mod results;
pub mod scanner;
pub mod telemetry;
