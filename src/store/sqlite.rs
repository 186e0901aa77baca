use super::LoadLog;
use crate::error::{Result, TrackerError};
use crate::record::LoadRecord;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Local SQLite copy of the load log, for offline use.
pub struct LoadStore {
    conn: Mutex<Connection>,
}

impl LoadStore {
    /// Open (or create) the store. `":memory:"` gives a throwaway database.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS loads (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL UNIQUE,
                date_added TEXT NOT NULL,
                customer TEXT NOT NULL,
                reference TEXT NOT NULL,
                equipment TEXT NOT NULL,
                container TEXT NOT NULL,
                rate TEXT NOT NULL,
                file TEXT NOT NULL,
                status TEXT NOT NULL,
                notes TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_loads_reference ON loads(reference)",
            [],
        )?;

        conn.execute("CREATE INDEX IF NOT EXISTS idx_loads_file ON loads(file)", [])?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        info!(loads = store.count()?, "Database initialized successfully");
        Ok(store)
    }

    /// Stable row id from the two fields that must be unique.
    pub fn generate_uid(reference: &str, file: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(reference.as_bytes());
        hasher.update([0u8]);
        hasher.update(file.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TrackerError::Poisoned)
    }

    pub fn count(&self) -> Result<usize> {
        let n = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM loads", [], |row| row.get(0))?;
        Ok(n)
    }

    fn insert_all(&self, records: &[LoadRecord]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO loads
                    (uid, date_added, customer, reference, equipment, container, rate, file, status, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for r in records {
                stmt.execute(params![
                    Self::generate_uid(&r.reference, &r.file),
                    r.date_added,
                    r.customer,
                    r.reference,
                    r.equipment,
                    r.container,
                    r.rate,
                    r.file,
                    r.status,
                    r.notes,
                ])?;
            }
        }
        tx.commit()?;
        info!(count = records.len(), "Loads stored");
        Ok(())
    }

    fn select_all(&self) -> Result<Vec<LoadRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date_added, customer, reference, equipment, container, rate, file, status, notes
             FROM loads
             ORDER BY seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LoadRecord {
                date_added: row.get(0)?,
                customer: row.get(1)?,
                reference: row.get(2)?,
                equipment: row.get(3)?,
                container: row.get(4)?,
                rate: row.get(5)?,
                file: row.get(6)?,
                status: row.get(7)?,
                notes: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[async_trait]
impl LoadLog for LoadStore {
    async fn load_all(&self) -> Result<Vec<LoadRecord>> {
        self.select_all()
    }

    async fn append(&self, records: &[LoadRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.insert_all(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerSettings;
    use crate::intake::{Upload, process_uploads};
    use crate::record::sample;

    #[test]
    fn test_uid_generation() {
        let uid1 = LoadStore::generate_uid("R-1", "a.pdf");
        let uid2 = LoadStore::generate_uid("R-1", "a.pdf");
        let uid3 = LoadStore::generate_uid("R-1a", ".pdf");

        assert_eq!(uid1, uid2);
        assert_ne!(uid1, uid3);
    }

    #[tokio::test]
    async fn test_append_then_reload_roundtrip() {
        let store = LoadStore::new(":memory:").unwrap();
        let mut rec = sample("R-1", "a.pdf", "1470.00");
        rec.notes = "rush, call before".to_string();
        let recs = vec![rec, sample("R-2", "b.pdf", "400")];

        store.append(&recs).await.unwrap();

        assert_eq!(store.load_all().await.unwrap(), recs);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_append_preserves_order_across_calls() {
        let store = LoadStore::new(":memory:").unwrap();
        store.append(&[sample("R-2", "b.pdf", "400")]).await.unwrap();
        store.append(&[]).await.unwrap();
        store.append(&[sample("R-1", "a.pdf", "400")]).await.unwrap();

        let refs: Vec<String> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.reference)
            .collect();
        assert_eq!(refs, vec!["R-2", "R-1"]);
    }

    #[tokio::test]
    async fn test_second_upload_of_same_load_leaves_store_unchanged() {
        let store = LoadStore::new(":memory:").unwrap();
        let settings = TrackerSettings::default();
        let from_text =
            |b: &[u8]| crate::heuristics::extract_ratecon(&String::from_utf8_lossy(b));

        let first = Upload::from_bytes("a.pdf", b"Load # L-1\nRate: 400".to_vec());
        let report = process_uploads(&[first], &[], &settings, "2025-03-14", from_text);
        store.append(&report.accepted).await.unwrap();

        let again = [
            Upload::from_bytes("a.pdf", b"Load # L-2".to_vec()),
            Upload::from_bytes("renamed.pdf", b"Load # L-1".to_vec()),
        ];
        let existing = store.load_all().await.unwrap();
        let report = process_uploads(&again, &existing, &settings, "2025-03-15", from_text);
        assert!(report.accepted.is_empty());
        assert_eq!(report.skipped.len(), 2);
        store.append(&report.accepted).await.unwrap();

        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_file_backed_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("loads.db");
        let store = LoadStore::new(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(path.exists());
    }
}
