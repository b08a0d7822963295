//! Run orchestration: prefixes → scans → parse → publish → archive.
//!
//! Stages run strictly one after another. An empty or failed prefix fetch
//! and a scan pass with no successes both end the run early; neither is an
//! error for the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use netsweep_core::{HostRecord, Prefix};
use netsweep_ipam::{AddressSink, PrefixSource, PublishSummary};

use crate::error::Result;

/// Runs the scanner over a set of prefixes.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Attempt every prefix. Returns the ones that scanned successfully, or
    /// `NoScansCompleted` if none did.
    async fn run_scans(&self, prefixes: &[Prefix]) -> Result<Vec<Prefix>>;
}

/// Reads hosts out of the scanner's output.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn parse_results(&self) -> Vec<HostRecord>;
}

/// Archives finished scan documents.
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn archive(&self) -> Result<i32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Scan and parse, but neither publish nor archive.
    pub dry_run: bool,
    /// Publish, but leave scan documents in place.
    pub skip_archive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    NoPrefixes,
    NoScansCompleted {
        attempted: usize,
    },
    Completed {
        scanned: usize,
        hosts: usize,
        published: usize,
        failed: usize,
        archive_exit: Option<i32>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// One discovery run over borrowed components.
pub struct Pipeline<'a> {
    prefixes: &'a dyn PrefixSource,
    scanner: &'a dyn ScanRunner,
    results: &'a dyn ResultSource,
    sink: &'a dyn AddressSink,
    archiver: &'a dyn Archiver,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        prefixes: &'a dyn PrefixSource,
        scanner: &'a dyn ScanRunner,
        results: &'a dyn ResultSource,
        sink: &'a dyn AddressSink,
        archiver: &'a dyn Archiver,
        options: RunOptions,
    ) -> Self {
        Self {
            prefixes,
            scanner,
            results,
            sink,
            archiver,
            options,
        }
    }

    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("run", run_id = %run_id);

        let outcome = self.execute().instrument(span).await;

        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcome,
        }
    }

    async fn execute(&self) -> RunOutcome {
        let prefixes = match self.prefixes.fetch_discoverable_prefixes().await {
            Ok(prefixes) if !prefixes.is_empty() => prefixes,
            Ok(_) => {
                tracing::info!("No prefixes tagged for discovery, nothing to do");
                return RunOutcome::NoPrefixes;
            }
            Err(_) => {
                tracing::info!("Prefix fetch failed, nothing to do");
                return RunOutcome::NoPrefixes;
            }
        };

        let scanned = match self.scanner.run_scans(&prefixes).await {
            Ok(scanned) => scanned,
            Err(_) => {
                return RunOutcome::NoScansCompleted {
                    attempted: prefixes.len(),
                };
            }
        };

        let records = self.results.parse_results().await;

        if self.options.dry_run {
            for record in &records {
                tracing::info!(
                    address = %record.cidr(),
                    os_name = %record.os_name,
                    state = record.state.as_deref().unwrap_or("unknown"),
                    "Dry run: would publish"
                );
            }
            return RunOutcome::Completed {
                scanned: scanned.len(),
                hosts: records.len(),
                published: 0,
                failed: 0,
                archive_exit: None,
            };
        }

        let PublishSummary { submitted, failed } = self.sink.publish(&records).await;

        let archive_exit = if self.options.skip_archive {
            tracing::info!("Archiving skipped");
            None
        } else {
            match self.archiver.archive().await {
                Ok(code) => Some(code),
                Err(e) => {
                    tracing::error!(error = %e, "Archiving failed");
                    None
                }
            }
        };

        RunOutcome::Completed {
            scanned: scanned.len(),
            hosts: records.len(),
            published: submitted,
            failed,
            archive_exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::DiscoverError;
    use netsweep_core::OS_NOT_DETECTED;
    use netsweep_ipam::IpamError;

    struct FakePrefixes(Option<Vec<Prefix>>);

    #[async_trait]
    impl PrefixSource for FakePrefixes {
        async fn fetch_discoverable_prefixes(&self) -> std::result::Result<Vec<Prefix>, IpamError> {
            self.0
                .clone()
                .ok_or_else(|| IpamError::Decode("missing field `results`".to_string()))
        }
    }

    /// Succeeds for the listed prefixes only.
    #[derive(Default)]
    struct FakeScanner {
        succeed: Vec<Prefix>,
        attempted: Mutex<Vec<Prefix>>,
    }

    #[async_trait]
    impl ScanRunner for FakeScanner {
        async fn run_scans(&self, prefixes: &[Prefix]) -> Result<Vec<Prefix>> {
            self.attempted.lock().unwrap().extend_from_slice(prefixes);
            let ok: Vec<Prefix> = prefixes
                .iter()
                .filter(|p| self.succeed.contains(p))
                .cloned()
                .collect();
            if ok.is_empty() {
                return Err(DiscoverError::NoScansCompleted {
                    attempted: prefixes.len(),
                });
            }
            Ok(ok)
        }
    }

    #[derive(Default)]
    struct FakeResults {
        records: Vec<HostRecord>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResultSource for FakeResults {
        async fn parse_results(&self) -> Vec<HostRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.clone()
        }
    }

    /// Rejects addresses listed in `reject`.
    #[derive(Default)]
    struct FakeSink {
        reject: Vec<String>,
        published: Mutex<Vec<HostRecord>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AddressSink for FakeSink {
        async fn publish(&self, records: &[HostRecord]) -> PublishSummary {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut summary = PublishSummary::default();
            for record in records {
                if self.reject.contains(&record.address) {
                    summary.failed += 1;
                } else {
                    summary.submitted += 1;
                    self.published.lock().unwrap().push(record.clone());
                }
            }
            summary
        }
    }

    #[derive(Default)]
    struct FakeArchiver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Archiver for FakeArchiver {
        async fn archive(&self) -> Result<i32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    fn record(address: &str) -> HostRecord {
        HostRecord {
            address: address.to_string(),
            subnet: "24".to_string(),
            os_name: OS_NOT_DETECTED.to_string(),
            state: Some("up".to_string()),
        }
    }

    fn prefixes(list: &[&str]) -> Vec<Prefix> {
        list.iter().map(|p| Prefix::from(*p)).collect()
    }

    struct Harness {
        prefixes: FakePrefixes,
        scanner: FakeScanner,
        results: FakeResults,
        sink: FakeSink,
        archiver: FakeArchiver,
    }

    impl Harness {
        fn new(listed: Option<Vec<Prefix>>, succeed: Vec<Prefix>, records: Vec<HostRecord>) -> Self {
            Self {
                prefixes: FakePrefixes(listed),
                scanner: FakeScanner {
                    succeed,
                    ..Default::default()
                },
                results: FakeResults {
                    records,
                    ..Default::default()
                },
                sink: FakeSink::default(),
                archiver: FakeArchiver::default(),
            }
        }

        async fn run(&self, options: RunOptions) -> RunReport {
            Pipeline::new(
                &self.prefixes,
                &self.scanner,
                &self.results,
                &self.sink,
                &self.archiver,
                options,
            )
            .run()
            .await
        }

        fn downstream_calls(&self) -> (usize, usize, usize) {
            (
                self.results.calls.load(Ordering::SeqCst),
                self.sink.calls.load(Ordering::SeqCst),
                self.archiver.calls.load(Ordering::SeqCst),
            )
        }
    }

    #[tokio::test]
    async fn test_failed_prefix_fetch_stops_before_scanning() {
        let h = Harness::new(None, Vec::new(), Vec::new());
        let report = h.run(RunOptions::default()).await;

        assert_eq!(report.outcome, RunOutcome::NoPrefixes);
        assert!(h.scanner.attempted.lock().unwrap().is_empty());
        assert_eq!(h.downstream_calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_empty_prefix_list_stops_before_scanning() {
        let h = Harness::new(Some(Vec::new()), Vec::new(), Vec::new());
        let report = h.run(RunOptions::default()).await;

        assert_eq!(report.outcome, RunOutcome::NoPrefixes);
        assert!(h.scanner.attempted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_successful_scans_skips_parse_publish_archive() {
        let listed = prefixes(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]);
        let h = Harness::new(Some(listed.clone()), Vec::new(), vec![record("10.0.0.5")]);
        let report = h.run(RunOptions::default()).await;

        assert_eq!(report.outcome, RunOutcome::NoScansCompleted { attempted: 3 });
        assert_eq!(*h.scanner.attempted.lock().unwrap(), listed);
        assert_eq!(h.downstream_calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_partial_scan_success_proceeds() {
        let listed = prefixes(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]);
        let h = Harness::new(
            Some(listed),
            prefixes(&["10.0.1.0/24"]),
            vec![record("10.0.1.5"), record("10.0.1.6")],
        );
        let report = h.run(RunOptions::default()).await;

        assert_eq!(
            report.outcome,
            RunOutcome::Completed {
                scanned: 1,
                hosts: 2,
                published: 2,
                failed: 0,
                archive_exit: Some(0),
            }
        );
        assert_eq!(h.downstream_calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_publish_failures_are_counted_and_archive_still_runs() {
        let mut h = Harness::new(
            Some(prefixes(&["10.0.0.0/24"])),
            prefixes(&["10.0.0.0/24"]),
            vec![record("10.0.0.5"), record("10.0.0.6"), record("10.0.0.7")],
        );
        h.sink.reject = vec!["10.0.0.6".to_string()];
        let report = h.run(RunOptions::default()).await;

        match report.outcome {
            RunOutcome::Completed {
                published,
                failed,
                archive_exit,
                ..
            } => {
                assert_eq!(published, 2);
                assert_eq!(failed, 1);
                assert_eq!(archive_exit, Some(0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let published: Vec<_> = h
            .sink
            .published
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.address.clone())
            .collect();
        assert_eq!(published, vec!["10.0.0.5", "10.0.0.7"]);
    }

    #[tokio::test]
    async fn test_dry_run_neither_publishes_nor_archives() {
        let h = Harness::new(
            Some(prefixes(&["10.0.0.0/24"])),
            prefixes(&["10.0.0.0/24"]),
            vec![record("10.0.0.5")],
        );
        let report = h
            .run(RunOptions {
                dry_run: true,
                ..Default::default()
            })
            .await;

        assert!(matches!(
            report.outcome,
            RunOutcome::Completed {
                hosts: 1,
                published: 0,
                ..
            }
        ));
        assert_eq!(h.downstream_calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_skip_archive_still_publishes() {
        let h = Harness::new(
            Some(prefixes(&["10.0.0.0/24"])),
            prefixes(&["10.0.0.0/24"]),
            vec![record("10.0.0.5")],
        );
        let report = h
            .run(RunOptions {
                skip_archive: true,
                ..Default::default()
            })
            .await;

        assert!(matches!(
            report.outcome,
            RunOutcome::Completed {
                published: 1,
                archive_exit: None,
                ..
            }
        ));
        assert_eq!(h.downstream_calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_report_serializes_flat() {
        let h = Harness::new(Some(Vec::new()), Vec::new(), Vec::new());
        let report = h.run(RunOptions::default()).await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "no_prefixes");
        assert_eq!(json["run_id"], report.run_id.to_string());
        assert!(report.finished_at >= report.started_at);
    }
}
