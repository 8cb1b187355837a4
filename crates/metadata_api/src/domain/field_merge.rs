use common::domain::{Device, DeviceRepository, DomainError, DomainResult};
use std::sync::Arc;
use tracing::debug;

use crate::domain::reference_resolver::find_by_id_then_name;
use crate::domain::{ReferenceResolver, UpdateDeviceRequest};

/// Applies partial updates onto stored devices
///
/// Only fields present in the request are written. Replaced references are
/// re-resolved against their registries and copied in whole.
pub struct FieldMergeEngine {
    resolver: Arc<ReferenceResolver>,
    devices: Arc<dyn DeviceRepository>,
}

impl FieldMergeEngine {
    pub fn new(resolver: Arc<ReferenceResolver>, devices: Arc<dyn DeviceRepository>) -> Self {
        Self { resolver, devices }
    }

    /// Find the device an update targets, by ID first and then by name
    pub async fn locate_existing(&self, request: &UpdateDeviceRequest) -> DomainResult<Device> {
        let id = request.id.as_deref().unwrap_or_default();
        let name = request.name.as_deref().unwrap_or_default();

        if id.is_empty() && name.is_empty() {
            return Err(DomainError::ValidationError(
                "device id or name is required".to_string(),
            ));
        }

        let devices = &self.devices;
        find_by_id_then_name(
            id,
            name,
            |id| devices.get_device_by_id(id),
            |name| devices.get_device_by_name(name),
        )
        .await?
        .ok_or_else(|| {
            let key = if id.is_empty() { name } else { id };
            DomainError::DeviceNotFound(key.to_string())
        })
    }

    /// Merge the request onto `existing`, returning the record to persist
    pub async fn merge(
        &self,
        request: &UpdateDeviceRequest,
        mut existing: Device,
    ) -> DomainResult<Device> {
        if let Some(hint) = &request.addressable {
            existing.addressable = self
                .resolver
                .resolve_addressable(hint)
                .await
                .map_err(|e| reference_not_found(e, "addressable not found for updated device"))?;
        }

        if let Some(hint) = &request.service {
            existing.service = self
                .resolver
                .resolve_device_service(hint)
                .await
                .map_err(|e| {
                    reference_not_found(e, "device service not found for updated device")
                })?;
        }

        if let Some(hint) = &request.profile {
            existing.profile = self
                .resolver
                .resolve_device_profile(hint)
                .await
                .map_err(|e| {
                    reference_not_found(e, "device profile not found for updated device")
                })?;
        }

        if let Some(admin_state) = request.admin_state {
            existing.admin_state = admin_state;
        }
        if let Some(description) = &request.description {
            existing.description = description.clone();
        }
        if let Some(labels) = &request.labels {
            existing.labels = labels.clone();
        }
        if let Some(last_connected) = request.last_connected {
            existing.last_connected = last_connected;
        }
        if let Some(last_reported) = request.last_reported {
            existing.last_reported = last_reported;
        }
        if let Some(location) = &request.location {
            existing.location = Some(location.clone());
        }
        if let Some(operating_state) = request.operating_state {
            existing.operating_state = operating_state;
        }
        if let Some(origin) = request.origin {
            existing.origin = origin;
        }

        if let Some(name) = &request.name {
            existing.name = name.clone();
            self.check_name_available(&existing).await?;
        }

        Ok(existing)
    }

    /// Advisory check; the registry rejects a lost race on its own
    async fn check_name_available(&self, device: &Device) -> DomainResult<()> {
        debug!(device_name = %device.name, "checking device name is free");

        match self.devices.get_device_by_name(&device.name).await {
            Ok(Some(holder)) if holder.id != device.id => {
                Err(DomainError::DeviceNameConflict(device.name.clone()))
            }
            Ok(_) | Err(DomainError::DeviceNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn reference_not_found(err: DomainError, message: &str) -> DomainError {
    match err {
        DomainError::ReferenceNotFound(_) => DomainError::ReferenceNotFound(message.to_string()),
        other => other,
    }
}
