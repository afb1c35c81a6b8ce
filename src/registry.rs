//! Device admission and active-device handoff.
//!
//! A license may be installed on up to `max_devices` devices but used on only
//! one at a time. Whichever device most recently activated is the active one;
//! the previous active device stays a member but loses access immediately.
//! There is no explicit deactivation and no eviction: once the slots are
//! taken, new devices are refused for the life of the license.
//!
//! `admit` works on an in-memory `License` and is always called inside
//! `LicenseStore::mutate_devices`, which provides the per-license lock and
//! persists the result only if admission succeeds.

use crate::error::{LicenseError, LicenseResult};
use crate::models::{License, RegisteredDevice};

/// Default number of devices a license may be installed on.
pub const DEFAULT_MAX_DEVICES: usize = 2;

/// Outcome of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// True when the device took a new slot.
    pub newly_registered: bool,
    /// Previously active device that lost the active slot.
    pub displaced: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceRegistry {
    max_devices: usize,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEVICES)
    }
}

impl DeviceRegistry {
    pub fn new(max_devices: usize) -> Self {
        Self { max_devices }
    }

    pub fn max_devices(&self) -> usize {
        self.max_devices
    }

    /// Admit `device_id` to `license` and make it the active device.
    ///
    /// On error the license is left exactly as it was.
    pub fn admit(
        &self,
        license: &mut License,
        device_id: &str,
        now: i64,
    ) -> LicenseResult<Admission> {
        if license.is_expired(now) {
            return Err(LicenseError::Expired);
        }

        let newly_registered = match license.devices.iter_mut().find(|d| d.device_id == device_id) {
            Some(existing) => {
                existing.last_activated_at = now;
                false
            }
            None => {
                if license.devices.len() >= self.max_devices {
                    return Err(LicenseError::DeviceLimitExceeded {
                        limit: self.max_devices,
                    });
                }
                license.devices.push(RegisteredDevice {
                    device_id: device_id.to_string(),
                    registered_at: now,
                    last_activated_at: now,
                });
                true
            }
        };

        let displaced = license
            .active_device
            .replace(device_id.to_string())
            .filter(|previous| previous != device_id);

        Ok(Admission {
            newly_registered,
            displaced,
        })
    }
}
