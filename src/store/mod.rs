// src/store/mod.rs

mod sheets;
mod sqlite;

pub use sheets::SheetsLog;
pub use sqlite::LoadStore;

use crate::config::{Config, StoreBackend};
use crate::error::Result;
use crate::record::LoadRecord;
use async_trait::async_trait;
use tracing::info;

/// Where processed loads live. Append-only: rows are never edited or removed.
#[async_trait]
pub trait LoadLog: Send + Sync {
    /// Every stored record, in insertion order.
    async fn load_all(&self) -> Result<Vec<LoadRecord>>;

    /// Append records after the existing ones.
    async fn append(&self, records: &[LoadRecord]) -> Result<()>;
}

/// Open the backend selected in the config.
pub async fn open(cfg: &Config) -> Result<Box<dyn LoadLog>> {
    match cfg.store {
        StoreBackend::Sheets => {
            info!(spreadsheet = %cfg.sheet.spreadsheet_id, worksheet = %cfg.sheet.worksheet, "Using Google Sheets store");
            Ok(Box::new(SheetsLog::connect(cfg).await?))
        }
        StoreBackend::Sqlite => {
            info!(db_path = %cfg.db_path, "Using SQLite store");
            Ok(Box::new(LoadStore::new(&cfg.db_path)?))
        }
    }
}
