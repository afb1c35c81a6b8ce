//! Durable license storage.
//!
//! `LicenseStore` is the only place license state lives. The service never
//! holds a license across calls; every change goes through `mutate_devices`,
//! which serializes writers per license id.

mod memory;
mod sqlite;

pub use memory::MemoryLicenseStore;
pub use sqlite::SqliteLicenseStore;

use crate::error::LicenseResult;
use crate::models::License;

/// Callback applied to a license under its lock. Returning an error aborts
/// the mutation without writing anything.
pub type DeviceMutation<'a> = &'a mut dyn FnMut(&mut License) -> LicenseResult<()>;

pub trait LicenseStore: Send + Sync {
    /// Insert a new license.
    ///
    /// Fails with `DuplicateSourceRef` (carrying the bound id) if `source_ref`
    /// already has a license, and with `DuplicateId` if `id` is taken.
    fn create(
        &self,
        id: &str,
        source_ref: &str,
        created_at: i64,
        expires_at: i64,
    ) -> LicenseResult<License>;

    fn get_by_id(&self, id: &str) -> LicenseResult<Option<License>>;

    fn get_by_source_ref(&self, source_ref: &str) -> LicenseResult<Option<License>>;

    /// Atomically read-modify-write the device fields of one license
    /// (`devices`, `active_device`, `legal_accepted_at`).
    ///
    /// Fails with `NotFound` if `id` is unknown. Concurrent calls for the same
    /// id run one after another; calls for different ids do not block each
    /// other beyond what the backend imposes.
    fn mutate_devices(&self, id: &str, f: DeviceMutation<'_>) -> LicenseResult<License>;
}
