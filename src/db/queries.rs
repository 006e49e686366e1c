use rusqlite::params;

use super::connection::Database;
use crate::errors::{Result, XrefError};
use crate::normalize::normalize;
use crate::types::PartRecord;

/// Maps a row from the `access_parts` table to a `PartRecord`.
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<PartRecord> {
    Ok(PartRecord {
        reference_number: row.get("reference_number")?,
        make: row.get("make")?,
        part_number: row.get("part_number")?,
        company: row.get("company")?,
        description: row.get("description")?,
    })
}

impl Database {
    /// Appends a batch of records inside a single transaction.
    pub fn insert_records(&self, records: &[PartRecord]) -> Result<usize> {
        let tx = self.conn().unchecked_transaction().map_err(|e| XrefError::Database {
            message: format!("failed to begin transaction: {e}"),
            operation: "insert_records".to_string(),
        })?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO access_parts
                        (reference_number, make, part_number, company, description)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| XrefError::Database {
                    message: format!("failed to prepare statement: {e}"),
                    operation: "insert_records".to_string(),
                })?;

            for record in records {
                stmt.execute(params![
                    record.reference_number,
                    record.make,
                    record.part_number,
                    record.company,
                    record.description,
                ])
                .map_err(|e| XrefError::Database {
                    message: format!("failed to insert record: {e}"),
                    operation: "insert_records".to_string(),
                })?;
            }
        }

        tx.commit().map_err(|e| XrefError::Database {
            message: format!("failed to commit transaction: {e}"),
            operation: "insert_records".to_string(),
        })?;
        Ok(records.len())
    }

    /// Returns every record in insertion order.
    pub fn get_all_records(&self) -> Result<Vec<PartRecord>> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT reference_number, make, part_number, company, description
                 FROM access_parts ORDER BY id",
            )
            .map_err(|e| XrefError::Database {
                message: format!("failed to prepare query: {e}"),
                operation: "get_all_records".to_string(),
            })?;

        let rows = stmt
            .query_map([], row_to_record)
            .map_err(|e| XrefError::Database {
                message: format!("failed to query records: {e}"),
                operation: "get_all_records".to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| XrefError::Database {
                message: format!("failed to read record row: {e}"),
                operation: "get_all_records".to_string(),
            })?);
        }
        Ok(records)
    }

    /// Returns records whose part number or reference number normalizes to
    /// the same identifier as `raw`, up to `limit` rows.
    pub fn get_records_by_identifier(&self, raw: &str, limit: usize) -> Result<Vec<PartRecord>> {
        let id = normalize(raw);
        if id.is_empty() {
            return Ok(Vec::new());
        }

        let sql = "SELECT reference_number, make, part_number, company, description
                   FROM access_parts
                   WHERE xref_normalize(part_number) = ?1
                      OR xref_normalize(reference_number) = ?1
                   ORDER BY id
                   LIMIT ?2";
        let mut stmt = self.conn().prepare(sql).map_err(|e| XrefError::Database {
            message: format!("failed to prepare query: {e}"),
            operation: "get_records_by_identifier".to_string(),
        })?;

        let rows = stmt
            .query_map(params![id, limit as i64], row_to_record)
            .map_err(|e| XrefError::Database {
                message: format!("failed to query records by identifier: {e}"),
                operation: "get_records_by_identifier".to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| XrefError::Database {
                message: format!("failed to read record row: {e}"),
                operation: "get_records_by_identifier".to_string(),
            })?);
        }
        Ok(records)
    }

    /// Returns the number of stored records.
    pub fn count_records(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM access_parts", [], |row| row.get(0))
            .map_err(|e| XrefError::Database {
                message: format!("failed to count records: {e}"),
                operation: "count_records".to_string(),
            })?;
        Ok(count as u64)
    }

    /// Removes every record.
    pub fn clear(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM access_parts", [])
            .map_err(|e| XrefError::Database {
                message: format!("failed to clear records: {e}"),
                operation: "clear".to_string(),
            })?;
        Ok(())
    }
}
