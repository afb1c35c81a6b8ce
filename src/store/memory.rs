use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{LicenseError, LicenseResult};
use crate::models::License;

use super::{DeviceMutation, LicenseStore};

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, Arc<Mutex<License>>>,
    by_source_ref: HashMap<String, String>,
}

/// In-process store with one mutex per license.
///
/// Nothing survives a restart; use it for tests and `--ephemeral` dev runs.
#[derive(Clone, Default)]
pub struct MemoryLicenseStore {
    inner: Arc<RwLock<Inner>>,
}

fn poisoned<T>(_: T) -> LicenseError {
    LicenseError::Internal("license store lock poisoned".into())
}

impl MemoryLicenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: &str) -> LicenseResult<Option<Arc<Mutex<License>>>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.by_id.get(id).cloned())
    }

    fn snapshot(entry: &Mutex<License>) -> LicenseResult<License> {
        Ok(entry.lock().map_err(poisoned)?.clone())
    }
}

impl LicenseStore for MemoryLicenseStore {
    fn create(
        &self,
        id: &str,
        source_ref: &str,
        created_at: i64,
        expires_at: i64,
    ) -> LicenseResult<License> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if let Some(existing_id) = inner.by_source_ref.get(source_ref) {
            return Err(LicenseError::DuplicateSourceRef {
                existing_id: existing_id.clone(),
            });
        }
        if inner.by_id.contains_key(id) {
            return Err(LicenseError::DuplicateId);
        }

        let license = License {
            id: id.to_string(),
            source_ref: source_ref.to_string(),
            created_at,
            expires_at,
            devices: vec![],
            active_device: None,
            legal_accepted_at: None,
        };
        inner
            .by_source_ref
            .insert(source_ref.to_string(), id.to_string());
        inner
            .by_id
            .insert(id.to_string(), Arc::new(Mutex::new(license.clone())));

        Ok(license)
    }

    fn get_by_id(&self, id: &str) -> LicenseResult<Option<License>> {
        match self.entry(id)? {
            Some(entry) => Self::snapshot(&entry).map(Some),
            None => Ok(None),
        }
    }

    fn get_by_source_ref(&self, source_ref: &str) -> LicenseResult<Option<License>> {
        let id = {
            let inner = self.inner.read().map_err(poisoned)?;
            inner.by_source_ref.get(source_ref).cloned()
        };
        match id {
            Some(id) => self.get_by_id(&id),
            None => Ok(None),
        }
    }

    fn mutate_devices(&self, id: &str, f: DeviceMutation<'_>) -> LicenseResult<License> {
        // Map lock is released before the license lock is taken
        let entry = self.entry(id)?.ok_or(LicenseError::NotFound)?;
        let mut guard = entry.lock().map_err(poisoned)?;

        let mut updated = guard.clone();
        f(&mut updated)?;

        guard.devices = updated.devices;
        guard.active_device = updated.active_device;
        guard.legal_accepted_at = updated.legal_accepted_at;

        Ok(guard.clone())
    }
}
