//! Batch ingestion - runs bureau XML files from disk through the pipeline

use anyhow::{bail, Result};
use credit_report_backend::config::Config;
use credit_report_backend::ingestion::ingest_files;
use std::env;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    let files: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if files.is_empty() {
        bail!("usage: ingest-report <report.xml>...");
    }

    info!("Starting report ingestion for {} files", files.len());

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let store = config.connect_store().await?;
    let policy = config.default_policy();

    let stats = ingest_files(&files, store.as_ref(), &policy).await;

    if stats.errors > 0 {
        bail!("{} of {} files failed", stats.errors, files.len());
    }
    Ok(())
}
