//! Fetch functions - retrieve raw report bytes

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Read a bureau report from disk
pub async fn read_report_file(path: &Path) -> Result<Vec<u8>> {
    info!("Reading report from {:?}", path);

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    info!("Read {} bytes", bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_report_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("report.xml");
        std::fs::write(&path, b"<INProfileResponse/>").unwrap();

        let bytes = read_report_file(&path).await.unwrap();
        assert_eq!(bytes, b"<INProfileResponse/>");
    }

    #[tokio::test]
    async fn test_read_missing_file_names_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.xml");

        let err = read_report_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("missing.xml"));
    }
}
