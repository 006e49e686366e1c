//! The record store the engine loads snapshots from.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::db::Database;
use crate::errors::{Result, XrefError};
use crate::types::PartRecord;

/// Source of truth for part records.
///
/// `all_records` must yield every record before a snapshot build completes.
/// `by_identifier` is a direct lookup that bypasses any snapshot.
pub trait RecordStore: Send + Sync {
    fn all_records(&self) -> Result<Vec<PartRecord>>;

    fn by_identifier(&self, raw: &str, limit: usize) -> Result<Vec<PartRecord>>;
}

/// `RecordStore` backed by the SQLite `access_parts` table.
///
/// A store created with [`open`](Self::open) connects on first use and drops
/// the connection after a failed query, so a database that is missing or
/// broken at startup is picked up once it becomes available.
pub struct SqliteRecordStore {
    path: Option<PathBuf>,
    db: Mutex<Option<Database>>,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self {
            path: None,
            db: Mutex::new(Some(db)),
        }
    }

    /// Creates a store for the database file at `db_path` without touching it.
    pub fn open(db_path: &Path) -> Self {
        Self {
            path: Some(db_path.to_path_buf()),
            db: Mutex::new(None),
        }
    }

    /// Runs `f` with exclusive access to the database, connecting first if
    /// needed.
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let mut slot = self.db.lock().map_err(|_| XrefError::StoreUnavailable {
            message: "database lock poisoned".to_string(),
        })?;

        let db = match slot.take() {
            Some(db) => db,
            None => match &self.path {
                Some(path) => {
                    let db = Database::open(path)?;
                    debug!(path = %path.display(), "opened record store");
                    db
                }
                None => {
                    return Err(XrefError::StoreUnavailable {
                        message: "database connection lost".to_string(),
                    })
                }
            },
        };

        let result = f(&db);
        // Reconnect on the next call unless there is no file to reconnect to.
        if result.is_ok() || self.path.is_none() {
            *slot = Some(db);
        }
        result
    }
}

/// Failures while talking to the store surface as `StoreUnavailable`.
fn unavailable(e: XrefError) -> XrefError {
    match e {
        XrefError::StoreUnavailable { .. } => e,
        other => XrefError::StoreUnavailable {
            message: other.to_string(),
        },
    }
}

impl RecordStore for SqliteRecordStore {
    fn all_records(&self) -> Result<Vec<PartRecord>> {
        self.with_db(|db| db.get_all_records()).map_err(unavailable)
    }

    fn by_identifier(&self, raw: &str, limit: usize) -> Result<Vec<PartRecord>> {
        self.with_db(|db| db.get_records_by_identifier(raw, limit))
            .map_err(unavailable)
    }
}

/// In-memory `RecordStore` over a fixed record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<PartRecord>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<PartRecord>) -> Self {
        Self { records }
    }
}

impl RecordStore for MemoryRecordStore {
    fn all_records(&self) -> Result<Vec<PartRecord>> {
        Ok(self.records.clone())
    }

    fn by_identifier(&self, raw: &str, limit: usize) -> Result<Vec<PartRecord>> {
        let id = crate::normalize::normalize(raw);
        if id.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .iter()
            .filter(|r| {
                [&r.part_number, &r.reference_number]
                    .into_iter()
                    .flatten()
                    .any(|field| crate::normalize::normalize(field) == id)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
