//! License orchestration: issuing, activation and validation.
//!
//! `LicenseService` owns no state of its own. Every decision is made against
//! a fresh read from the store, and every change goes through
//! `LicenseStore::mutate_devices` so that the device registry runs under the
//! license's lock.

use std::sync::Arc;

use crate::clock::{Clock, SECONDS_PER_DAY};
use crate::error::{LicenseError, LicenseResult};
use crate::id::{gen_license_id, is_valid_license_id};
use crate::models::{Activation, Issued, License, LicenseSummary, Validation};
use crate::registry::{Admission, DeviceRegistry};
use crate::store::LicenseStore;

/// Longest plan that can be issued.
pub const MAX_PLAN_DAYS: i64 = 3650;

/// Longest accepted source reference or device id.
pub const MAX_REF_LEN: usize = 256;

pub struct LicenseService {
    store: Arc<dyn LicenseStore>,
    clock: Arc<dyn Clock>,
    registry: DeviceRegistry,
}

fn check_device_id(device_id: &str) -> LicenseResult<()> {
    if device_id.trim().is_empty() || device_id.len() > MAX_REF_LEN {
        return Err(LicenseError::InvalidDeviceId);
    }
    Ok(())
}

impl LicenseService {
    pub fn new(
        store: Arc<dyn LicenseStore>,
        clock: Arc<dyn Clock>,
        registry: DeviceRegistry,
    ) -> Self {
        Self {
            store,
            clock,
            registry,
        }
    }

    pub fn max_devices(&self) -> usize {
        self.registry.max_devices()
    }

    /// Look up a license. Ids that could never have been issued are reported
    /// as not found without touching the store.
    pub fn get_license(&self, license_id: &str) -> LicenseResult<License> {
        if !is_valid_license_id(license_id) {
            return Err(LicenseError::NotFound);
        }
        self.store
            .get_by_id(license_id)?
            .ok_or(LicenseError::NotFound)
    }

    /// Mint a license for a purchase (or admin grant) identified by `source_ref`.
    ///
    /// Calling this again with the same `source_ref` returns the license
    /// created the first time, with `created = false`, whatever the duration.
    pub fn create_license(&self, source_ref: &str, plan_duration_days: i64) -> LicenseResult<Issued> {
        let source_ref = source_ref.trim();
        if source_ref.is_empty() || source_ref.len() > MAX_REF_LEN {
            return Err(LicenseError::InvalidSourceRef);
        }
        if !(1..=MAX_PLAN_DAYS).contains(&plan_duration_days) {
            return Err(LicenseError::InvalidDuration(plan_duration_days));
        }

        let now = self.clock.now();
        let expires_at = now + plan_duration_days * SECONDS_PER_DAY;
        let id = gen_license_id();

        match self.store.create(&id, source_ref, now, expires_at) {
            Ok(license) => {
                tracing::info!(
                    license_id = %license.id,
                    source_ref = %license.source_ref,
                    expires_at = license.expires_at,
                    days = plan_duration_days,
                    "License issued"
                );
                Ok(Issued {
                    license,
                    created: true,
                })
            }
            Err(LicenseError::DuplicateSourceRef { existing_id }) => {
                let license = self.store.get_by_id(&existing_id)?.ok_or_else(|| {
                    LicenseError::Internal(format!(
                        "source_ref {} bound to missing license {}",
                        source_ref, existing_id
                    ))
                })?;

                if license.duration_days() != plan_duration_days {
                    tracing::warn!(
                        license_id = %license.id,
                        source_ref = %source_ref,
                        existing_days = license.duration_days(),
                        requested_days = plan_duration_days,
                        "Repeated issue request with a different duration; keeping original"
                    );
                } else {
                    tracing::debug!(
                        license_id = %license.id,
                        source_ref = %source_ref,
                        "License already issued for source_ref"
                    );
                }

                Ok(Issued {
                    license,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Activate `device_id` on a license, making it the only active device.
    pub fn activate(
        &self,
        license_id: &str,
        device_id: &str,
        legal_accepted: bool,
    ) -> LicenseResult<Activation> {
        check_device_id(device_id)?;
        if !is_valid_license_id(license_id) {
            return Err(LicenseError::NotFound);
        }

        if !legal_accepted {
            // Unknown links are reported as such before asking for consent
            self.store
                .get_by_id(license_id)?
                .ok_or(LicenseError::NotFound)?;
            return Err(LicenseError::LegalConsentRequired);
        }

        let now = self.clock.now();
        let registry = self.registry;
        let mut admission: Option<Admission> = None;

        let result = self.store.mutate_devices(license_id, &mut |license: &mut License| {
            let admitted = registry.admit(license, device_id, now)?;
            if license.legal_accepted_at.is_none() {
                license.legal_accepted_at = Some(now);
            }
            admission = Some(admitted);
            Ok(())
        });

        let license = match result {
            Ok(license) => license,
            Err(e) => {
                if !e.is_storage() {
                    tracing::warn!(
                        license_id = %license_id,
                        device_id = %device_id,
                        reason = e.code(),
                        "Activation rejected"
                    );
                }
                return Err(e);
            }
        };

        let admission = admission
            .ok_or_else(|| LicenseError::Internal("mutation committed without admission".into()))?;

        if admission.newly_registered {
            tracing::info!(
                license_id = %license.id,
                device_id = %device_id,
                devices = license.devices.len(),
                max_devices = self.registry.max_devices(),
                "Device registered"
            );
        }
        if let Some(displaced) = &admission.displaced {
            tracing::info!(
                license_id = %license.id,
                device_id = %device_id,
                displaced = %displaced,
                "Active device displaced"
            );
        }

        Ok(Activation {
            expires_at: license.expires_at,
            newly_registered: admission.newly_registered,
            displaced: admission.displaced,
        })
    }

    /// Read-only check: may `device_id` use the license right now?
    ///
    /// Unknown licenses are not an error here; they simply are not authorized.
    pub fn validate(&self, license_id: &str, device_id: &str) -> LicenseResult<Validation> {
        let license = match self.get_license(license_id) {
            Ok(license) => license,
            Err(LicenseError::NotFound) => return Ok(Validation::not_found()),
            Err(e) => return Err(e),
        };

        let state = license.device_state(device_id, self.clock.now());

        Ok(Validation {
            authorized: state.is_authorized(),
            expires_at: Some(license.expires_at),
            state: Some(state),
        })
    }

    /// Public summary of a license.
    pub fn license_status(&self, license_id: &str) -> LicenseResult<LicenseSummary> {
        let license = self.get_license(license_id)?;

        Ok(LicenseSummary {
            expired: license.is_expired(self.clock.now()),
            created_at: license.created_at,
            expires_at: license.expires_at,
            device_count: license.devices.len(),
            max_devices: self.registry.max_devices(),
            has_active_device: license.active_device.is_some(),
        })
    }
}
