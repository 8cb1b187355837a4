use common::domain::{
    AddressableRepository, DeviceProfileRepository, DeviceReportRepository, DeviceRepository,
    DeviceServiceRepository,
};
use std::sync::Arc;

/// Registry handles shared by the device management components
#[derive(Clone)]
pub struct MetadataRepositories {
    pub devices: Arc<dyn DeviceRepository>,
    pub addressables: Arc<dyn AddressableRepository>,
    pub device_services: Arc<dyn DeviceServiceRepository>,
    pub device_profiles: Arc<dyn DeviceProfileRepository>,
    pub device_reports: Arc<dyn DeviceReportRepository>,
}

impl MetadataRepositories {
    /// Use one backend for every registry
    pub fn from_registry<R>(registry: Arc<R>) -> Self
    where
        R: DeviceRepository
            + AddressableRepository
            + DeviceServiceRepository
            + DeviceProfileRepository
            + DeviceReportRepository
            + 'static,
    {
        Self {
            devices: registry.clone(),
            addressables: registry.clone(),
            device_services: registry.clone(),
            device_profiles: registry.clone(),
            device_reports: registry,
        }
    }
}
