use crate::domain::addressable::Addressable;
use crate::domain::device::{AdminState, OperatingState};
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Service that owns and drives a set of devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub addressable: Addressable,
    pub operating_state: OperatingState,
    pub admin_state: AdminState,
    pub last_connected: i64,
    pub last_reported: i64,
}

/// Registry lookups for device services
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceServiceRepository: Send + Sync {
    /// Get a device service by ID
    async fn get_device_service_by_id(&self, id: &str) -> DomainResult<Option<DeviceService>>;

    /// Get a device service by its unique name
    async fn get_device_service_by_name(&self, name: &str)
        -> DomainResult<Option<DeviceService>>;
}
