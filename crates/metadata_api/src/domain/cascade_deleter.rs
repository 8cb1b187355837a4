use common::domain::{
    ChangeAction, Device, DeviceReportRepository, DeviceRepository, DomainResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::DeviceNotifier;

/// Removes a device together with the reports that reference it.
///
/// Nothing here is transactional. A failed report delete stops the cascade
/// with the earlier reports already gone and the device still stored; calling
/// `delete_device` again picks up where it stopped.
pub struct CascadeDeleter {
    devices: Arc<dyn DeviceRepository>,
    device_reports: Arc<dyn DeviceReportRepository>,
    notifier: Arc<DeviceNotifier>,
}

impl CascadeDeleter {
    pub fn new(
        devices: Arc<dyn DeviceRepository>,
        device_reports: Arc<dyn DeviceReportRepository>,
        notifier: Arc<DeviceNotifier>,
    ) -> Self {
        Self {
            devices,
            device_reports,
            notifier,
        }
    }

    #[instrument(skip(self, device), fields(device_id = %device.id, device_name = %device.name))]
    pub async fn delete_device(&self, device: &Device) -> DomainResult<()> {
        let reports = self
            .device_reports
            .list_device_reports_by_device_name(&device.name)
            .await?;
        debug!(report_count = reports.len(), "deleting dependent reports");

        for report in &reports {
            self.device_reports.delete_device_report(&report.id).await?;
            debug!(report_id = %report.id, "deleted device report");

            // The report is gone; a retried delete could not announce it again
            if let Err(e) = self
                .notifier
                .notify_device_report(report, ChangeAction::Deleted)
                .await
            {
                warn!(report_id = %report.id, error = %e, "failed to announce deleted report");
            }
        }

        self.devices.delete_device(&device.id).await?;
        info!("deleted device");

        self.notifier
            .notify_device(device, ChangeAction::Deleted)
            .await
    }
}
