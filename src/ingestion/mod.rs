//! Report ingestion module - bureau XML in, canonical CreditReport out, then upsert

pub mod defaults;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod tree;
pub mod types;
pub mod utils;
pub mod write;

pub use error::{IngestError, StoreError, XmlError};
pub use pipeline::{ingest, ingest_files, Ingested};
pub use types::*;
pub use write::{MemoryReportStore, PgReportStore, ReportStore};
