use chrono::Utc;
use common::config::NotificationConfig;
use common::domain::{
    AssociateNotifier, ChangeAction, Device, DeviceReport, DeviceRepository, DeviceService,
    DeviceServiceRepository, DomainError, DomainResult, EntityType, Notification,
    NotificationCategory, NotificationSeverity, NotificationSink,
};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::domain::MetadataRepositories;

/// Fans device changes out to the owning device service and, when enabled,
/// to the external notification sink.
///
/// The two paths fail differently. Sink failures are logged and dropped.
/// Associate failures are returned, even though the change they announce is
/// already committed.
pub struct DeviceNotifier {
    config: NotificationConfig,
    sink: Arc<dyn NotificationSink>,
    associates: Arc<dyn AssociateNotifier>,
    devices: Arc<dyn DeviceRepository>,
    device_services: Arc<dyn DeviceServiceRepository>,
}

impl DeviceNotifier {
    pub fn new(
        config: NotificationConfig,
        sink: Arc<dyn NotificationSink>,
        associates: Arc<dyn AssociateNotifier>,
        repositories: &MetadataRepositories,
    ) -> Self {
        Self {
            config,
            sink,
            associates,
            devices: repositories.devices.clone(),
            device_services: repositories.device_services.clone(),
        }
    }

    /// Announce a device change
    #[instrument(skip(self, device), fields(device_id = %device.id, device_name = %device.name, action = %action))]
    pub async fn notify_device(&self, device: &Device, action: ChangeAction) -> DomainResult<()> {
        self.post_notification(&device.name, action).await;

        let service = self.owning_service(device).await?;
        self.notify_associates(service, &device.id, action, EntityType::Device)
            .await
    }

    /// Announce a report change to the service owning the report's device
    #[instrument(skip(self, report), fields(report_id = %report.id, device_name = %report.device, action = %action))]
    pub async fn notify_device_report(
        &self,
        report: &DeviceReport,
        action: ChangeAction,
    ) -> DomainResult<()> {
        let device = self
            .devices
            .get_device_by_name(&report.device)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(report.device.clone()))?;

        let service = self.owning_service(&device).await?;
        self.notify_associates(service, &report.id, action, EntityType::Report)
            .await
    }

    /// Build the external notification record for a change
    pub fn build_notification(
        &self,
        device_name: &str,
        action: ChangeAction,
        now_millis: i64,
    ) -> Notification {
        Notification {
            slug: format!("{}{}", self.config.slug_prefix, now_millis),
            content: format!("{}{}-{}", self.config.content_prefix, device_name, action),
            category: NotificationCategory::SwHealth,
            description: self.config.description.clone(),
            labels: vec![self.config.label.clone()],
            sender: self.config.sender.clone(),
            severity: NotificationSeverity::Normal,
        }
    }

    async fn post_notification(&self, device_name: &str, action: ChangeAction) {
        if !self.config.post_device_changes {
            return;
        }

        // Slugs collide when two changes land in the same millisecond
        let notification =
            self.build_notification(device_name, action, Utc::now().timestamp_millis());
        let slug = notification.slug.clone();

        match self.sink.send(notification).await {
            Ok(()) => debug!(slug = %slug, "posted device change notification"),
            Err(e) => warn!(slug = %slug, error = %e, "failed to post device change notification"),
        }
    }

    async fn owning_service(&self, device: &Device) -> DomainResult<DeviceService> {
        let service_id = device.service.id.as_str();

        match self.device_services.get_device_service_by_id(service_id).await {
            Ok(Some(service)) => Ok(service),
            Ok(None) | Err(DomainError::InvalidIdentifier(_)) => {
                error!(service_id = %service_id, "owning device service not found");
                Err(DomainError::AssociateNotificationFailed(format!(
                    "device service {} not found",
                    service_id
                )))
            }
            Err(e) => {
                error!(service_id = %service_id, error = %e, "failed to load owning device service");
                Err(e)
            }
        }
    }

    async fn notify_associates(
        &self,
        service: DeviceService,
        entity_id: &str,
        action: ChangeAction,
        entity_type: EntityType,
    ) -> DomainResult<()> {
        let service_name = service.name.clone();

        self.associates
            .notify_associates(vec![service], entity_id, action, entity_type)
            .await
            .map_err(|e| {
                error!(service = %service_name, error = %e, "associate notification failed");
                DomainError::AssociateNotificationFailed(format!("{}: {}", service_name, e))
            })
    }
}
