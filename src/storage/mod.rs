//! Dataset persistence.
//!
//! Whole datasets are written as indented JSON. Exports are named after the
//! day they were taken:
//!
//! ```text
//! exports/
//! ├── ai-intelligence-data-2024-06-20.json
//! └── ai-intelligence-data-2024-06-21.json
//! ```

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::Dataset;

pub use local::LocalStorage;

/// File name for an export taken on `date`.
pub fn export_name(date: NaiveDate) -> String {
    format!("ai-intelligence-data-{}.json", date.format("%Y-%m-%d"))
}

/// Trait for dataset storage backends.
#[async_trait]
pub trait DatasetStorage: Send + Sync {
    /// Write `dataset` under `key`, replacing any previous copy.
    async fn save(&self, key: &str, dataset: &Dataset) -> Result<PathBuf>;

    /// Read the dataset stored under `key`, `None` when absent.
    async fn load(&self, key: &str) -> Result<Option<Dataset>>;

    /// Write a dated export of `dataset`.
    async fn export(&self, dataset: &Dataset) -> Result<PathBuf> {
        let key = export_name(Utc::now().date_naive());
        self.save(&key, dataset).await
    }
}

/// Parse a dataset file chosen by the user.
///
/// Anything that is not a complete dataset is rejected as
/// [`AppError::Import`].
pub async fn import_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::import(path.display(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::import(path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(export_name(date), "ai-intelligence-data-2024-06-05.json");
    }

    #[tokio::test]
    async fn test_import_rejects_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        tokio::fs::write(&path, br#"{"newTools": "not a list"}"#).await.unwrap();

        let err = import_file(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Import { .. }));

        let missing = import_file(tmp.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(missing, AppError::Import { .. }));
    }
}
