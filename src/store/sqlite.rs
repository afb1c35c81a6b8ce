use crate::db::{queries, DbPool};
use crate::error::LicenseResult;
use crate::models::License;

use super::{DeviceMutation, LicenseStore};

/// SQLite-backed store. Survives restarts and is safe to share between
/// processes using the same database file.
#[derive(Clone)]
pub struct SqliteLicenseStore {
    pool: DbPool,
}

impl SqliteLicenseStore {
    /// Wrap a pool whose schema has already been initialized with `init_db`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl LicenseStore for SqliteLicenseStore {
    fn create(
        &self,
        id: &str,
        source_ref: &str,
        created_at: i64,
        expires_at: i64,
    ) -> LicenseResult<License> {
        let conn = self.pool.get()?;
        queries::create_license(&conn, id, source_ref, created_at, expires_at)
    }

    fn get_by_id(&self, id: &str) -> LicenseResult<Option<License>> {
        let conn = self.pool.get()?;
        queries::get_license_by_id(&conn, id)
    }

    fn get_by_source_ref(&self, source_ref: &str) -> LicenseResult<Option<License>> {
        let conn = self.pool.get()?;
        queries::get_license_by_source_ref(&conn, source_ref)
    }

    fn mutate_devices(&self, id: &str, f: DeviceMutation<'_>) -> LicenseResult<License> {
        let mut conn = self.pool.get()?;
        let (license, ()) = queries::mutate_devices_atomic(&mut conn, id, |license| f(license))?;
        Ok(license)
    }
}
