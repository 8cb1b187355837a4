use crate::domain::{
    Addressable, AddressableRepository, Device, DeviceProfile, DeviceProfileRepository,
    DeviceReport, DeviceReportRepository, DeviceRepository, DeviceService,
    DeviceServiceRepository, DomainError, DomainResult,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    devices: BTreeMap<String, Device>,
    addressables: BTreeMap<String, Addressable>,
    device_services: BTreeMap<String, DeviceService>,
    device_profiles: BTreeMap<String, DeviceProfile>,
    // Insertion order is the enumeration order
    device_reports: Vec<DeviceReport>,
}

/// In-memory implementation of every registry trait
///
/// Identifiers are xids. Lookups with anything else fail with
/// `DomainError::InvalidIdentifier`, the way a document store rejects a
/// malformed object id.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an addressable, assigning an ID when it has none
    pub async fn insert_addressable(&self, mut addressable: Addressable) -> Addressable {
        if addressable.id.is_empty() {
            addressable.id = xid::new().to_string();
        }
        let mut state = self.state.write().await;
        state
            .addressables
            .insert(addressable.id.clone(), addressable.clone());
        addressable
    }

    /// Store a device service, assigning an ID when it has none
    pub async fn insert_device_service(&self, mut service: DeviceService) -> DeviceService {
        if service.id.is_empty() {
            service.id = xid::new().to_string();
        }
        let mut state = self.state.write().await;
        state
            .device_services
            .insert(service.id.clone(), service.clone());
        service
    }

    /// Store a device profile, assigning an ID when it has none
    pub async fn insert_device_profile(&self, mut profile: DeviceProfile) -> DeviceProfile {
        if profile.id.is_empty() {
            profile.id = xid::new().to_string();
        }
        let mut state = self.state.write().await;
        state
            .device_profiles
            .insert(profile.id.clone(), profile.clone());
        profile
    }

    /// Append a device report, assigning an ID when it has none
    pub async fn insert_device_report(&self, mut report: DeviceReport) -> DeviceReport {
        if report.id.is_empty() {
            report.id = xid::new().to_string();
        }
        let mut state = self.state.write().await;
        state.device_reports.push(report.clone());
        report
    }

    pub async fn device_report_count(&self) -> usize {
        self.state.read().await.device_reports.len()
    }
}

/// An xid renders as 20 characters of base32hex
fn check_id(id: &str) -> DomainResult<()> {
    let well_formed = id.len() == 20
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='v').contains(&c));

    if well_formed {
        Ok(())
    } else {
        Err(DomainError::InvalidIdentifier(id.to_string()))
    }
}

fn name_taken(state: &RegistryState, name: &str, except_id: &str) -> bool {
    state
        .devices
        .values()
        .any(|d| d.name == name && d.id != except_id)
}

fn collect_devices<F>(state: &RegistryState, filter: F) -> Vec<Device>
where
    F: Fn(&Device) -> bool,
{
    state
        .devices
        .values()
        .filter(|d| filter(*d))
        .cloned()
        .collect()
}

#[async_trait]
impl DeviceRepository for InMemoryRegistry {
    async fn get_device_by_id(&self, id: &str) -> DomainResult<Option<Device>> {
        check_id(id)?;
        let state = self.state.read().await;
        Ok(state.devices.get(id).cloned())
    }

    async fn get_device_by_name(&self, name: &str) -> DomainResult<Option<Device>> {
        let state = self.state.read().await;
        Ok(state.devices.values().find(|d| d.name == name).cloned())
    }

    async fn add_device(&self, mut device: Device) -> DomainResult<Device> {
        check_id(&device.id)?;
        let mut state = self.state.write().await;

        if name_taken(&state, &device.name, &device.id) {
            return Err(DomainError::DeviceNameConflict(device.name));
        }
        if state.devices.contains_key(&device.id) {
            return Err(DomainError::RepositoryError(anyhow::anyhow!(
                "device id {} already stored",
                device.id
            )));
        }

        let now = Utc::now();
        device.created_at = Some(now);
        device.updated_at = Some(now);
        state.devices.insert(device.id.clone(), device.clone());

        debug!(device_id = %device.id, "stored device");
        Ok(device)
    }

    async fn update_device(&self, mut device: Device) -> DomainResult<Device> {
        check_id(&device.id)?;
        let mut state = self.state.write().await;

        let created_at = match state.devices.get(&device.id) {
            Some(stored) => stored.created_at,
            None => return Err(DomainError::DeviceNotFound(device.id)),
        };
        if name_taken(&state, &device.name, &device.id) {
            return Err(DomainError::DeviceNameConflict(device.name));
        }

        device.created_at = created_at;
        device.updated_at = Some(Utc::now());
        state.devices.insert(device.id.clone(), device.clone());
        Ok(device)
    }

    async fn delete_device(&self, id: &str) -> DomainResult<()> {
        check_id(id)?;
        let mut state = self.state.write().await;
        state
            .devices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::DeviceNotFound(id.to_string()))
    }

    async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(collect_devices(&state, |_| true))
    }

    async fn list_devices_with_label(&self, label: &str) -> DomainResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(collect_devices(&state, |d| d.labels.iter().any(|l| l == label)))
    }

    async fn list_devices_by_service_id(&self, service_id: &str) -> DomainResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(collect_devices(&state, |d| d.service.id == service_id))
    }

    async fn list_devices_by_profile_id(&self, profile_id: &str) -> DomainResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(collect_devices(&state, |d| d.profile.id == profile_id))
    }

    async fn list_devices_by_addressable_id(
        &self,
        addressable_id: &str,
    ) -> DomainResult<Vec<Device>> {
        let state = self.state.read().await;
        Ok(collect_devices(&state, |d| d.addressable.id == addressable_id))
    }
}

#[async_trait]
impl AddressableRepository for InMemoryRegistry {
    async fn get_addressable_by_id(&self, id: &str) -> DomainResult<Option<Addressable>> {
        check_id(id)?;
        let state = self.state.read().await;
        Ok(state.addressables.get(id).cloned())
    }

    async fn get_addressable_by_name(&self, name: &str) -> DomainResult<Option<Addressable>> {
        let state = self.state.read().await;
        Ok(state.addressables.values().find(|a| a.name == name).cloned())
    }
}

#[async_trait]
impl DeviceServiceRepository for InMemoryRegistry {
    async fn get_device_service_by_id(&self, id: &str) -> DomainResult<Option<DeviceService>> {
        check_id(id)?;
        let state = self.state.read().await;
        Ok(state.device_services.get(id).cloned())
    }

    async fn get_device_service_by_name(
        &self,
        name: &str,
    ) -> DomainResult<Option<DeviceService>> {
        let state = self.state.read().await;
        Ok(state
            .device_services
            .values()
            .find(|s| s.name == name)
            .cloned())
    }
}

#[async_trait]
impl DeviceProfileRepository for InMemoryRegistry {
    async fn get_device_profile_by_id(&self, id: &str) -> DomainResult<Option<DeviceProfile>> {
        check_id(id)?;
        let state = self.state.read().await;
        Ok(state.device_profiles.get(id).cloned())
    }

    async fn get_device_profile_by_name(
        &self,
        name: &str,
    ) -> DomainResult<Option<DeviceProfile>> {
        let state = self.state.read().await;
        Ok(state
            .device_profiles
            .values()
            .find(|p| p.name == name)
            .cloned())
    }
}

#[async_trait]
impl DeviceReportRepository for InMemoryRegistry {
    async fn list_device_reports_by_device_name(
        &self,
        device_name: &str,
    ) -> DomainResult<Vec<DeviceReport>> {
        let state = self.state.read().await;
        Ok(state
            .device_reports
            .iter()
            .filter(|r| r.device == device_name)
            .cloned()
            .collect())
    }

    async fn delete_device_report(&self, report_id: &str) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let before = state.device_reports.len();
        state.device_reports.retain(|r| r.id != report_id);

        if state.device_reports.len() == before {
            return Err(DomainError::RepositoryError(anyhow::anyhow!(
                "device report {} not found",
                report_id
            )));
        }
        Ok(())
    }
}
