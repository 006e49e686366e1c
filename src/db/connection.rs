use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::errors::{Result, XrefError};
use crate::normalize::normalize;

/// Name of the SQL function that applies identifier normalization.
pub const NORMALIZE_FN: &str = "xref_normalize";

/// The embedded SQL schema applied when initializing a new database.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// SQLite database holding the part records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Creates a database at `db_path`, creating parent directories if needed,
    /// and applies the schema. Safe to call on an existing database.
    pub fn initialize(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| XrefError::Database {
                message: format!("failed to create database directory: {e}"),
                operation: "initialize".to_string(),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| XrefError::Database {
            message: format!("failed to open database: {e}"),
            operation: "initialize".to_string(),
        })?;

        Self::apply_pragmas(&conn)?;

        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| XrefError::Database {
                message: format!("failed to apply schema: {e}"),
                operation: "initialize".to_string(),
            })?;
        Self::register_functions(&conn)?;

        Ok(Self { conn })
    }

    /// Opens an existing database at `db_path`.
    ///
    /// Fails with `StoreUnavailable` when the file does not exist rather than
    /// silently creating an empty one.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(XrefError::StoreUnavailable {
                message: format!("no database found at '{}'", db_path.display()),
            });
        }

        let conn = Connection::open(db_path).map_err(|e| XrefError::Database {
            message: format!("failed to open database: {e}"),
            operation: "open".to_string(),
        })?;

        Self::apply_pragmas(&conn)?;
        Self::register_functions(&conn)?;

        Ok(Self { conn })
    }

    /// Opens a private in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| XrefError::Database {
            message: format!("failed to open in-memory database: {e}"),
            operation: "in_memory".to_string(),
        })?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| XrefError::Database {
                message: format!("failed to apply schema: {e}"),
                operation: "in_memory".to_string(),
            })?;
        Self::register_functions(&conn)?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Returns the on-disk size of the database file in bytes.
    pub fn size(&self) -> Result<u64> {
        let size: i64 = self
            .conn
            .query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get(0),
            )
            .map_err(|e| XrefError::Database {
                message: format!("failed to get database size: {e}"),
                operation: "size".to_string(),
            })?;
        Ok(size as u64)
    }

    fn apply_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 30000;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(|e| XrefError::Database {
            message: format!("failed to apply pragmas: {e}"),
            operation: "apply_pragmas".to_string(),
        })
    }

    /// Makes `normalize` callable from SQL so stored values and user input
    /// go through the same normalization.
    fn register_functions(conn: &Connection) -> Result<()> {
        conn.create_scalar_function(
            NORMALIZE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let raw: Option<String> = ctx.get(0)?;
                Ok(raw.map(|value| normalize(&value)))
            },
        )
        .map_err(|e| XrefError::Database {
            message: format!("failed to register {NORMALIZE_FN}: {e}"),
            operation: "register_functions".to_string(),
        })
    }
}
