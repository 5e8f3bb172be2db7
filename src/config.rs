//! Configuration loaded from environment variables

use crate::ingestion::defaults::{DefaultPolicy, NOT_AVAILABLE};
use crate::ingestion::{MemoryReportStore, PgReportStore, ReportStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// `DATABASE_URL` value selecting the in-process store
pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub max_upload_bytes: usize,
    pub pan_fallback: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = var("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .context("DATABASE_URL must be set (use memory:// for an in-process store)")?;

        let store = if database_url == MEMORY_STORE_URL {
            StoreConfig::Memory
        } else {
            StoreConfig::Postgres {
                url: database_url,
                max_connections: var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "5".to_string())
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be a valid number")?,
            }
        };

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a valid number between 1-65535")?,
            store,
            max_upload_bytes: var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|| (10 * 1024 * 1024).to_string())
                .parse()
                .context("MAX_UPLOAD_BYTES must be a valid number")?,
            pan_fallback: var("PAN_FALLBACK").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        })
    }

    pub fn default_policy(&self) -> DefaultPolicy {
        DefaultPolicy::default().with_pan_fallback(self.pan_fallback.clone())
    }

    /// Open the configured store, applying migrations for Postgres
    pub async fn connect_store(&self) -> Result<Arc<dyn ReportStore>> {
        match &self.store {
            StoreConfig::Postgres {
                url,
                max_connections,
            } => {
                info!("Connecting to database...");
                let store = PgReportStore::connect(url, *max_connections)
                    .await
                    .context("Failed to connect to database")?;
                store.migrate().await.context("Failed to apply migrations")?;
                info!("Database connected successfully");
                Ok(Arc::new(store))
            }
            StoreConfig::Memory => {
                warn!("Using in-memory report store; data is lost on exit");
                Ok(Arc::new(MemoryReportStore::new()))
            }
        }
    }
}
