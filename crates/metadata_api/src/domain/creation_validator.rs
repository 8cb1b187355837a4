use common::domain::{Device, DomainError, DomainResult};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{CreateDeviceRequest, ReferenceResolver};

const MISSING_ADDRESSABLE: &str = "device must be associated to an Addressable";
const MISSING_SERVICE: &str = "device must be associated with a device service";
const MISSING_PROFILE: &str = "device must be associated with a device profile";
const MISSING_STATE: &str = "device can't have null operating state or admin state";

/// Checks everything a new device needs before the registry may admit it
pub struct CreationValidator {
    resolver: Arc<ReferenceResolver>,
}

impl CreationValidator {
    pub fn new(resolver: Arc<ReferenceResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve the device's references and required states into a record
    /// ready for `add_device`, with a freshly generated ID
    pub async fn validate_for_create(&self, request: &CreateDeviceRequest) -> DomainResult<Device> {
        let addressable = self
            .resolver
            .resolve_addressable(&request.addressable)
            .await
            .map_err(|e| missing_association(e, MISSING_ADDRESSABLE))?;

        let service = self
            .resolver
            .resolve_device_service(&request.service)
            .await
            .map_err(|e| missing_association(e, MISSING_SERVICE))?;

        let profile = self
            .resolver
            .resolve_device_profile(&request.profile)
            .await
            .map_err(|e| missing_association(e, MISSING_PROFILE))?;

        let (Some(operating_state), Some(admin_state)) =
            (request.operating_state, request.admin_state)
        else {
            return Err(DomainError::MissingDeviceState(MISSING_STATE.to_string()));
        };

        let id = xid::new().to_string();
        debug!(device_id = %id, device_name = %request.name, "device passed creation checks");

        Ok(Device {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            labels: request.labels.clone(),
            location: request.location.clone(),
            addressable,
            service,
            profile,
            operating_state,
            admin_state,
            last_connected: request.last_connected,
            last_reported: request.last_reported,
            origin: request.origin,
            created_at: None,
            updated_at: None,
        })
    }
}

fn missing_association(err: DomainError, message: &str) -> DomainError {
    match err {
        DomainError::ReferenceNotFound(_) => DomainError::MissingAssociation(message.to_string()),
        other => other,
    }
}
