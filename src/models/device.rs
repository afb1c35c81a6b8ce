use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// A device that has successfully activated a license at least once.
///
/// Membership is permanent for the life of the license: being displaced
/// never removes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredDevice {
    /// Client-generated identifier, persisted on the device itself.
    pub device_id: String,
    pub registered_at: i64,
    pub last_activated_at: i64,
}

/// Where a device stands with respect to one license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceState {
    /// Never activated this license.
    Unknown,
    /// Member of the license and the single device allowed to use it.
    Active,
    /// Member of the license, superseded by another device.
    Displaced,
    /// The license has expired; terminal.
    Expired,
}

impl DeviceState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, DeviceState::Active)
    }
}
