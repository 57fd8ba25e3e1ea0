use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::models::pending::{PendingOfferRow, SHEET_HEADERS};
use crate::domain::ports::PendingOfferStore;
use crate::error::AppError;

/// CSV-file spreadsheet store. The header row is the fixed 15-column
/// schema; data rows are addressed purely by position. All mutations are
/// read-modify-write of the whole file behind one lock — the pipeline
/// assumes a single operator, and row indices are only stable under that
/// assumption.
pub struct CsvPendingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvPendingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<PendingOfferRow>, AppError> {
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        if !exists {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let mut rows = Vec::new();
        for record in reader.deserialize::<PendingOfferRow>() {
            rows.push(record.map_err(|e| {
                AppError::StoreUnavailable(format!("corrupt sheet {}: {}", self.path.display(), e))
            })?);
        }
        Ok(rows)
    }

    async fn save(&self, rows: &[PendingOfferRow]) -> Result<(), AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        }
        // An empty sheet still needs its header row.
        if rows.is_empty() {
            writer
                .write_record(SHEET_HEADERS)
                .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
            }
        }
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl PendingOfferStore for CsvPendingStore {
    async fn read_all(&self) -> Result<Vec<PendingOfferRow>, AppError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn append(&self, row: &PendingOfferRow) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut rows = self.load().await?;
        rows.push(row.clone());
        self.save(&rows).await
    }

    async fn delete_row(&self, index: usize) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut rows = self.load().await?;
        if index >= rows.len() {
            return Err(AppError::NotFound(format!("sheet row {}", index)));
        }
        rows.remove(index);
        self.save(&rows).await
    }
}
