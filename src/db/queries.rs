use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};

use crate::error::{LicenseError, LicenseResult};
use crate::models::{License, RegisteredDevice};

use super::from_row::{query_all, query_one, LicenseRow, DEVICE_COLS, LICENSE_COLS};

fn with_devices(row: LicenseRow, devices: Vec<RegisteredDevice>) -> License {
    License {
        id: row.id,
        source_ref: row.source_ref,
        created_at: row.created_at,
        expires_at: row.expires_at,
        devices,
        active_device: row.active_device,
        legal_accepted_at: row.legal_accepted_at,
    }
}

/// Which unique constraint an INSERT into `licenses` tripped, if any.
fn unique_violation_column(e: &rusqlite::Error) -> Option<&'static str> {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            if msg.contains("licenses.source_ref") {
                Some("source_ref")
            } else if msg.contains("licenses.id") {
                Some("id")
            } else {
                None
            }
        }
        _ => None,
    }
}

// ============ Licenses ============

/// Insert a new license with no devices.
///
/// Uniqueness of `id` and `source_ref` is enforced by the schema, so two
/// concurrent creates for the same purchase cannot both succeed.
pub fn create_license(
    conn: &Connection,
    id: &str,
    source_ref: &str,
    created_at: i64,
    expires_at: i64,
) -> LicenseResult<License> {
    let inserted = conn.execute(
        "INSERT INTO licenses (id, source_ref, created_at, expires_at, active_device, legal_accepted_at)
         VALUES (?1, ?2, ?3, ?4, NULL, NULL)",
        params![id, source_ref, created_at, expires_at],
    );

    if let Err(e) = inserted {
        return Err(match unique_violation_column(&e) {
            Some("source_ref") => {
                let existing = get_license_row_by_source_ref(conn, source_ref)?
                    .ok_or_else(|| {
                        LicenseError::Internal("source_ref conflict without a row".into())
                    })?;
                LicenseError::DuplicateSourceRef {
                    existing_id: existing.id,
                }
            }
            Some(_) => LicenseError::DuplicateId,
            None => e.into(),
        });
    }

    Ok(License {
        id: id.to_string(),
        source_ref: source_ref.to_string(),
        created_at,
        expires_at,
        devices: vec![],
        active_device: None,
        legal_accepted_at: None,
    })
}

fn get_license_row_by_id(conn: &Connection, id: &str) -> LicenseResult<Option<LicenseRow>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

fn get_license_row_by_source_ref(
    conn: &Connection,
    source_ref: &str,
) -> LicenseResult<Option<LicenseRow>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE source_ref = ?1", LICENSE_COLS),
        &[&source_ref],
    )
}

pub fn get_license_by_id(conn: &Connection, id: &str) -> LicenseResult<Option<License>> {
    let Some(row) = get_license_row_by_id(conn, id)? else {
        return Ok(None);
    };
    let devices = list_devices_for_license(conn, &row.id)?;
    Ok(Some(with_devices(row, devices)))
}

pub fn get_license_by_source_ref(
    conn: &Connection,
    source_ref: &str,
) -> LicenseResult<Option<License>> {
    let Some(row) = get_license_row_by_source_ref(conn, source_ref)? else {
        return Ok(None);
    };
    let devices = list_devices_for_license(conn, &row.id)?;
    Ok(Some(with_devices(row, devices)))
}

pub fn count_licenses(conn: &Connection) -> LicenseResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Devices ============

/// Devices of a license in registration order.
pub fn list_devices_for_license(
    conn: &Connection,
    license_id: &str,
) -> LicenseResult<Vec<RegisteredDevice>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM license_devices WHERE license_id = ?1 ORDER BY registered_at ASC, rowid ASC",
            DEVICE_COLS
        ),
        &[&license_id],
    )
}

/// Atomically read a license, let `f` change its device fields, and write
/// the result back.
///
/// This function uses a transaction with IMMEDIATE mode so the write lock is
/// taken before the license is read. Two concurrent activations of the same
/// license are therefore serialized and cannot both claim the last slot.
/// If `f` returns an error the transaction is rolled back and nothing is
/// written.
///
/// Only `devices`, `active_device` and `legal_accepted_at` are persisted;
/// changes `f` makes to any other field are ignored.
pub fn mutate_devices_atomic<T, F>(
    conn: &mut Connection,
    license_id: &str,
    f: F,
) -> LicenseResult<(License, T)>
where
    F: FnOnce(&mut License) -> LicenseResult<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = get_license_by_id(&tx, license_id)?.ok_or(LicenseError::NotFound)?;
    let mut updated = current.clone();

    // Dropping the transaction on error rolls it back
    let output = f(&mut updated)?;

    for device in &updated.devices {
        if current.device(&device.device_id) == Some(device) {
            continue;
        }
        tx.execute(
            "INSERT INTO license_devices (license_id, device_id, registered_at, last_activated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(license_id, device_id) DO UPDATE SET last_activated_at = excluded.last_activated_at",
            params![
                license_id,
                &device.device_id,
                device.registered_at,
                device.last_activated_at
            ],
        )?;
    }

    for device in &current.devices {
        if !updated.has_device(&device.device_id) {
            tx.execute(
                "DELETE FROM license_devices WHERE license_id = ?1 AND device_id = ?2",
                params![license_id, &device.device_id],
            )?;
        }
    }

    tx.execute(
        "UPDATE licenses SET active_device = ?1, legal_accepted_at = ?2 WHERE id = ?3",
        params![&updated.active_device, updated.legal_accepted_at, license_id],
    )?;

    tx.commit()?;

    Ok((
        License {
            id: current.id,
            source_ref: current.source_ref,
            created_at: current.created_at,
            expires_at: current.expires_at,
            ..updated
        },
        output,
    ))
}
