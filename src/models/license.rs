use serde::{Deserialize, Serialize};

use super::{DeviceState, RegisteredDevice};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// Unguessable id, also the activation link.
    pub id: String,
    /// Purchase session id or admin marker. Unique across licenses.
    pub source_ref: String,
    pub created_at: i64,
    /// Fixed at creation; never extended.
    pub expires_at: i64,
    /// Devices in registration order.
    pub devices: Vec<RegisteredDevice>,
    pub active_device: Option<String>,
    /// First activation that carried legal consent.
    pub legal_accepted_at: Option<i64>,
}

impl License {
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    pub fn has_device(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d.device_id == device_id)
    }

    pub fn device(&self, device_id: &str) -> Option<&RegisteredDevice> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }

    pub fn is_active_device(&self, device_id: &str) -> bool {
        self.active_device.as_deref() == Some(device_id)
    }

    /// Derive the state of `device_id` at time `now`.
    pub fn device_state(&self, device_id: &str, now: i64) -> DeviceState {
        if self.is_expired(now) {
            DeviceState::Expired
        } else if self.is_active_device(device_id) {
            DeviceState::Active
        } else if self.has_device(device_id) {
            DeviceState::Displaced
        } else {
            DeviceState::Unknown
        }
    }

    /// Plan length in whole days, as fixed at creation.
    pub fn duration_days(&self) -> i64 {
        (self.expires_at - self.created_at) / crate::clock::SECONDS_PER_DAY
    }
}

/// Result of a create call. `created` is false when the source reference
/// was already bound and the existing license was returned instead.
#[derive(Debug, Clone)]
pub struct Issued {
    pub license: License,
    pub created: bool,
}

/// Successful activation of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub expires_at: i64,
    /// True when this call consumed a device slot.
    pub newly_registered: bool,
    /// Device that lost the active slot to this one, if any.
    pub displaced: Option<String>,
}

/// Read-only answer to "may this device use the license right now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub authorized: bool,
    /// None when the license does not exist.
    pub expires_at: Option<i64>,
    /// None when the license does not exist.
    pub state: Option<DeviceState>,
}

impl Validation {
    pub fn not_found() -> Self {
        Self {
            authorized: false,
            expires_at: None,
            state: None,
        }
    }
}

/// Public summary of a license; never includes device ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseSummary {
    pub expired: bool,
    pub created_at: i64,
    pub expires_at: i64,
    pub device_count: usize,
    pub max_devices: usize,
    pub has_active_device: bool,
}
