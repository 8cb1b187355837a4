use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Template describing what a class of devices can do
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub model: String,
    pub labels: Vec<String>,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceProfileRepository: Send + Sync {
    async fn get_device_profile_by_id(&self, id: &str) -> DomainResult<Option<DeviceProfile>>;

    async fn get_device_profile_by_name(&self, name: &str)
        -> DomainResult<Option<DeviceProfile>>;
}
