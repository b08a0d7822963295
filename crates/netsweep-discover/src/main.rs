//! CLI entry point for a single netsweep discovery run.

use clap::Parser;

use netsweep_core::Settings;
use netsweep_ipam::IpamClient;

use netsweep_discover::archive::CommandArchiver;
use netsweep_discover::pipeline::{Pipeline, RunOptions};
use netsweep_discover::results::ScanDirectory;
use netsweep_discover::scanner::NmapScanner;
use netsweep_discover::telemetry;

#[derive(Parser)]
#[command(name = "netsweep-discover")]
#[command(about = "Scan IPAM prefixes tagged for discovery and publish the hosts found")]
struct Cli {
    /// Settings file prefix (default: config, i.e. config.toml).
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Scan and parse, but do not publish or archive.
    #[arg(long)]
    dry_run: bool,

    /// Publish, but leave scan documents in place.
    #[arg(long)]
    skip_archive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    telemetry::init(&settings.logging)?;

    let ipam = IpamClient::new(&settings.api, &settings.publish)?;
    let scanner = NmapScanner::new(&settings.nmap_script);
    let results = ScanDirectory::new(&settings.nmap_script);
    let archiver = CommandArchiver::new(&settings.archive);

    let options = RunOptions {
        dry_run: cli.dry_run,
        skip_archive: cli.skip_archive,
    };
    let pipeline = Pipeline::new(&ipam, &scanner, &results, &ipam, &archiver, options);
    let report = pipeline.run().await;

    tracing::info!(
        run_id = %report.run_id,
        outcome = ?report.outcome,
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Discovery run finished"
    );

    Ok(())
}
