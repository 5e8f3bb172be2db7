//! Ingestion orchestrator - parse, extract, then upsert

use crate::ingestion::defaults::DefaultPolicy;
use crate::ingestion::error::IngestError;
use crate::ingestion::fetch;
use crate::ingestion::parse::parse_report;
use crate::ingestion::types::{IngestStats, StoredReport, WriteOutcome};
use crate::ingestion::write::ReportStore;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of one successful ingestion
#[derive(Debug, Clone)]
pub struct Ingested {
    pub stored: StoredReport,
    pub outcome: WriteOutcome,
}

/// Run one report through the pipeline.
///
/// Extraction completes before the store is touched, so parse and
/// extraction failures never leave anything persisted.
pub async fn ingest(
    bytes: &[u8],
    store: &dyn ReportStore,
    policy: &DefaultPolicy,
) -> Result<Ingested, IngestError> {
    let report = parse_report(bytes, policy)?;

    let (stored, outcome) = store.upsert(&report).await?;
    info!(
        "Report {} {} (id: {}, {} accounts)",
        stored.report.report_number,
        outcome,
        stored.id,
        stored.report.credit_accounts.len()
    );

    Ok(Ingested { stored, outcome })
}

/// Ingest each file in turn. A failing file is logged and counted, and the
/// remaining files still run.
pub async fn ingest_files(
    paths: &[PathBuf],
    store: &dyn ReportStore,
    policy: &DefaultPolicy,
) -> IngestStats {
    let mut stats = IngestStats::default();

    for path in paths {
        let result = match fetch::read_report_file(path).await {
            Ok(bytes) => ingest(&bytes, store, policy)
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(ingested) => {
                info!(
                    "✓ {:?}: report {} {}",
                    path, ingested.stored.report.report_number, ingested.outcome
                );
                stats.record(ingested.outcome);
            }
            Err(e) => {
                warn!("✗ {:?} failed: {:#}", path, e);
                stats.errors += 1;
            }
        }
    }

    info!("Report ingestion complete: {}", stats);
    stats
}
