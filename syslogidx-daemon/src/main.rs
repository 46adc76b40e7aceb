use anyhow::Result;
use clap::Parser;

use syslogidx_daemon::cli::DaemonCli;
use syslogidx_daemon::logging;
use syslogidx_daemon::orchestrator::{self, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();
    let config = cli.load_config().await?;

    if cli.validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "syslogidx-daemon starting");

    if cli.cleanup {
        let report = orchestrator::run_cleanup(&config).await?;
        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            kept = report.kept,
            "cleanup finished"
        );
        return Ok(());
    }

    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await?;

    tracing::info!("syslogidx-daemon shut down");
    Ok(())
}
