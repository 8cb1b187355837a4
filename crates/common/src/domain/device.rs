use crate::domain::addressable::Addressable;
use crate::domain::device_profile::DeviceProfile;
use crate::domain::device_service::DeviceService;
use crate::domain::result::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational health of a device or device service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingState {
    #[default]
    Enabled,
    Disabled,
}

impl OperatingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingState::Enabled => "ENABLED",
            OperatingState::Disabled => "DISABLED",
        }
    }
}

impl FromStr for OperatingState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ENABLED" => Ok(OperatingState::Enabled),
            "DISABLED" => Ok(OperatingState::Disabled),
            _ => Err(DomainError::InvalidOperatingState(format!(
                "{} must be 'ENABLED' or 'DISABLED'",
                s
            ))),
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative lock state of a device or device service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminState {
    Locked,
    #[default]
    Unlocked,
}

impl AdminState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminState::Locked => "LOCKED",
            AdminState::Unlocked => "UNLOCKED",
        }
    }
}

impl FromStr for AdminState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOCKED" => Ok(AdminState::Locked),
            "UNLOCKED" => Ok(AdminState::Unlocked),
            _ => Err(DomainError::InvalidAdminState(format!(
                "{} must be 'LOCKED' or 'UNLOCKED'",
                s
            ))),
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain representation of a Device
///
/// `addressable`, `service` and `profile` are denormalized copies taken when
/// the device was last written. They are owned by their own registries and are
/// only refreshed when a device update re-resolves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub location: Option<serde_json::Value>,
    pub addressable: Addressable,
    pub service: DeviceService,
    pub profile: DeviceProfile,
    pub operating_state: OperatingState,
    pub admin_state: AdminState,
    /// Epoch millis, 0 when never set
    pub last_connected: i64,
    /// Epoch millis, 0 when never set
    pub last_reported: i64,
    pub origin: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Registry operations on devices
/// Infrastructure implements this trait; name uniqueness is enforced here and
/// surfaces as `DomainError::DeviceNameConflict`
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Get a device by ID
    async fn get_device_by_id(&self, id: &str) -> DomainResult<Option<Device>>;

    /// Get a device by its unique name
    async fn get_device_by_name(&self, name: &str) -> DomainResult<Option<Device>>;

    /// Add a new device
    async fn add_device(&self, device: Device) -> DomainResult<Device>;

    /// Replace a stored device, matched by ID
    async fn update_device(&self, device: Device) -> DomainResult<Device>;

    /// Delete a device by ID
    async fn delete_device(&self, id: &str) -> DomainResult<()>;

    /// List all devices
    async fn list_devices(&self) -> DomainResult<Vec<Device>>;

    /// List devices carrying a label
    async fn list_devices_with_label(&self, label: &str) -> DomainResult<Vec<Device>>;

    /// List devices owned by a device service
    async fn list_devices_by_service_id(&self, service_id: &str) -> DomainResult<Vec<Device>>;

    /// List devices built from a device profile
    async fn list_devices_by_profile_id(&self, profile_id: &str) -> DomainResult<Vec<Device>>;

    /// List devices reachable at an addressable
    async fn list_devices_by_addressable_id(
        &self,
        addressable_id: &str,
    ) -> DomainResult<Vec<Device>>;
}
