use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Scheduled report bound to a device by the device's name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub id: String,
    pub name: String,
    /// Name of the owning device
    pub device: String,
    pub event: String,
    pub expected: Vec<String>,
}

/// Registry operations on device reports
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceReportRepository: Send + Sync {
    /// List reports whose device field equals `device_name`, in registry order
    async fn list_device_reports_by_device_name(
        &self,
        device_name: &str,
    ) -> DomainResult<Vec<DeviceReport>>;

    /// Delete a single report
    async fn delete_device_report(&self, report_id: &str) -> DomainResult<()>;
}
