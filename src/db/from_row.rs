//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::error::LicenseResult;
use crate::models::RegisteredDevice;

/// Trait for constructing a type from a database row.
///
/// Implementing this trait allows using the `query_one` and `query_all`
/// helper functions, reducing repetitive row mapping closures.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> LicenseResult<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> LicenseResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_COLS: &str =
    "id, source_ref, created_at, expires_at, active_device, legal_accepted_at";

pub const DEVICE_COLS: &str = "device_id, registered_at, last_activated_at";

// ============ FromRow Implementations ============

/// A `licenses` row without its device list.
pub struct LicenseRow {
    pub id: String,
    pub source_ref: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub active_device: Option<String>,
    pub legal_accepted_at: Option<i64>,
}

impl FromRow for LicenseRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseRow {
            id: row.get(0)?,
            source_ref: row.get(1)?,
            created_at: row.get(2)?,
            expires_at: row.get(3)?,
            active_device: row.get(4)?,
            legal_accepted_at: row.get(5)?,
        })
    }
}

impl FromRow for RegisteredDevice {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(RegisteredDevice {
            device_id: row.get(0)?,
            registered_at: row.get(1)?,
            last_activated_at: row.get(2)?,
        })
    }
}
