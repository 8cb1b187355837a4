use common::config::QueryConfig;
use common::domain::{
    AdminState, ChangeAction, Device, DeviceLocator, DeviceRepository, DomainError, DomainResult,
    OperatingState, ReferenceHint,
};
use common::validation::{validate, validate_locator};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::{
    parse_notify_flag, parse_timestamp, CascadeDeleter, CreateDeviceRequest, CreationValidator,
    DeviceNotifier, FieldMergeEngine, MetadataRepositories, ReferenceResolver,
    SetAdminStateRequest, SetLastConnectedRequest, SetLastReportedRequest,
    SetOperatingStateRequest, UpdateDeviceRequest,
};

/// Domain service for device records
/// This is the orchestration layer a transport calls into
pub struct DeviceManagementService {
    devices: Arc<dyn DeviceRepository>,
    resolver: Arc<ReferenceResolver>,
    validator: CreationValidator,
    merger: FieldMergeEngine,
    deleter: CascadeDeleter,
    notifier: Arc<DeviceNotifier>,
    query_config: QueryConfig,
}

impl DeviceManagementService {
    pub fn new(
        repositories: MetadataRepositories,
        notifier: Arc<DeviceNotifier>,
        query_config: QueryConfig,
    ) -> Self {
        let resolver = Arc::new(ReferenceResolver::new(&repositories));

        Self {
            devices: repositories.devices.clone(),
            validator: CreationValidator::new(resolver.clone()),
            merger: FieldMergeEngine::new(resolver.clone(), repositories.devices.clone()),
            deleter: CascadeDeleter::new(
                repositories.devices.clone(),
                repositories.device_reports.clone(),
                notifier.clone(),
            ),
            resolver,
            notifier,
            query_config,
        }
    }

    /// Admit a new device
    /// References are resolved and copied into the stored record
    /// The registry is the final word on name uniqueness
    #[instrument(skip(self, request), fields(device_name = %request.name))]
    pub async fn create_device(&self, request: CreateDeviceRequest) -> DomainResult<Device> {
        validate(&request)?;

        let device = self.validator.validate_for_create(&request).await?;

        debug!(device_name = %device.name, "checking device name is free");
        if self.devices.get_device_by_name(&device.name).await?.is_some() {
            return Err(DomainError::DeviceNameConflict(device.name));
        }

        let device = self.devices.add_device(device).await?;
        info!(device_id = %device.id, "created device");

        self.notifier
            .notify_device(&device, ChangeAction::Created)
            .await?;

        Ok(device)
    }

    /// Apply a partial update to a device located by ID or name
    #[instrument(skip(self, request), fields(device_id = ?request.id, device_name = ?request.name))]
    pub async fn update_device(&self, request: UpdateDeviceRequest) -> DomainResult<Device> {
        validate(&request)?;

        let existing = self.merger.locate_existing(&request).await?;
        let merged = self.merger.merge(&request, existing).await?;

        let device = self.devices.update_device(merged).await?;
        info!(device_id = %device.id, "updated device");

        self.notifier
            .notify_device(&device, ChangeAction::Updated)
            .await?;

        Ok(device)
    }

    #[instrument(skip(self, request), fields(device = %request.device, operating_state = %request.operating_state))]
    pub async fn set_operating_state(
        &self,
        request: SetOperatingStateRequest,
    ) -> DomainResult<Device> {
        validate(&request)?;
        let state: OperatingState = request.operating_state.parse()?;

        let mut device = self.find_device(&request.device).await?;
        device.operating_state = state;

        self.persist_field_change(device, true).await
    }

    #[instrument(skip(self, request), fields(device = %request.device, admin_state = %request.admin_state))]
    pub async fn set_admin_state(&self, request: SetAdminStateRequest) -> DomainResult<Device> {
        validate(&request)?;
        let state: AdminState = request.admin_state.parse()?;

        let mut device = self.find_device(&request.device).await?;
        device.admin_state = state;

        self.persist_field_change(device, true).await
    }

    #[instrument(skip(self, request), fields(device = %request.device, last_connected = %request.last_connected))]
    pub async fn set_last_connected(
        &self,
        request: SetLastConnectedRequest,
    ) -> DomainResult<Device> {
        validate(&request)?;
        let last_connected = parse_timestamp("lastConnected", &request.last_connected)?;
        let notify = parse_notify_flag(request.notify.as_deref())?;

        let mut device = self.find_device(&request.device).await?;
        device.last_connected = last_connected;

        self.persist_field_change(device, notify).await
    }

    #[instrument(skip(self, request), fields(device = %request.device, last_reported = %request.last_reported))]
    pub async fn set_last_reported(&self, request: SetLastReportedRequest) -> DomainResult<Device> {
        validate(&request)?;
        let last_reported = parse_timestamp("lastReported", &request.last_reported)?;
        let notify = parse_notify_flag(request.notify.as_deref())?;

        let mut device = self.find_device(&request.device).await?;
        device.last_reported = last_reported;

        self.persist_field_change(device, notify).await
    }

    /// Delete a device and every report that references it
    #[instrument(skip(self), fields(device = %locator))]
    pub async fn delete_device(&self, locator: DeviceLocator) -> DomainResult<()> {
        let device = self.find_device(&locator).await?;
        self.deleter.delete_device(&device).await
    }

    #[instrument(skip(self), fields(device = %locator))]
    pub async fn get_device(&self, locator: DeviceLocator) -> DomainResult<Device> {
        self.find_device(&locator).await
    }

    /// Look a device up by a token that may be its name or its ID
    /// Names are tried first
    #[instrument(skip(self))]
    pub async fn check_device(&self, token: &str) -> DomainResult<Device> {
        validate_locator(&DeviceLocator::Name(token.to_string()))?;

        if let Some(device) = self.devices.get_device_by_name(token).await? {
            return Ok(device);
        }

        match self.devices.get_device_by_id(token).await {
            Ok(Some(device)) => Ok(device),
            Ok(None) | Err(_) => Err(DomainError::DeviceNotFound(token.to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let devices = self.devices.list_devices().await?;
        self.within_limit(devices)
    }

    #[instrument(skip(self))]
    pub async fn list_devices_with_label(&self, label: &str) -> DomainResult<Vec<Device>> {
        let devices = self.devices.list_devices_with_label(label).await?;
        self.within_limit(devices)
    }

    /// List the devices owned by a device service
    #[instrument(skip(self))]
    pub async fn list_devices_by_service(
        &self,
        service: &ReferenceHint,
    ) -> DomainResult<Vec<Device>> {
        let service = self
            .resolver
            .resolve_device_service(service)
            .await
            .map_err(|e| match e {
                DomainError::ReferenceNotFound(_) => {
                    DomainError::DeviceServiceNotFound(describe_hint(service))
                }
                other => other,
            })?;

        let devices = self.devices.list_devices_by_service_id(&service.id).await?;
        self.within_limit(devices)
    }

    /// List the devices built from a device profile
    #[instrument(skip(self))]
    pub async fn list_devices_by_profile(
        &self,
        profile: &ReferenceHint,
    ) -> DomainResult<Vec<Device>> {
        let profile = self
            .resolver
            .resolve_device_profile(profile)
            .await
            .map_err(|e| match e {
                DomainError::ReferenceNotFound(_) => {
                    DomainError::DeviceProfileNotFound(describe_hint(profile))
                }
                other => other,
            })?;

        let devices = self.devices.list_devices_by_profile_id(&profile.id).await?;
        self.within_limit(devices)
    }

    /// List the devices reachable at an addressable
    #[instrument(skip(self))]
    pub async fn list_devices_by_addressable(
        &self,
        addressable: &ReferenceHint,
    ) -> DomainResult<Vec<Device>> {
        let addressable = self
            .resolver
            .resolve_addressable(addressable)
            .await
            .map_err(|e| match e {
                DomainError::ReferenceNotFound(_) => {
                    DomainError::AddressableNotFound(describe_hint(addressable))
                }
                other => other,
            })?;

        let devices = self
            .devices
            .list_devices_by_addressable_id(&addressable.id)
            .await?;
        self.within_limit(devices)
    }

    async fn find_device(&self, locator: &DeviceLocator) -> DomainResult<Device> {
        validate_locator(locator)?;
        debug!(device = %locator, "loading device");

        let found = match locator {
            DeviceLocator::Id(id) => self.devices.get_device_by_id(id).await?,
            DeviceLocator::Name(name) => self.devices.get_device_by_name(name).await?,
        };

        found.ok_or_else(|| DomainError::DeviceNotFound(locator.value().to_string()))
    }

    async fn persist_field_change(&self, device: Device, notify: bool) -> DomainResult<Device> {
        let device = self.devices.update_device(device).await?;
        info!(device_id = %device.id, "updated device");

        if notify {
            self.notifier
                .notify_device(&device, ChangeAction::Updated)
                .await?;
        }

        Ok(device)
    }

    fn within_limit(&self, devices: Vec<Device>) -> DomainResult<Vec<Device>> {
        if devices.len() > self.query_config.read_max_limit {
            return Err(DomainError::ResultLimitExceeded(devices.len()));
        }
        Ok(devices)
    }
}

fn describe_hint(hint: &ReferenceHint) -> String {
    if hint.id.is_empty() {
        hint.name.clone()
    } else {
        hint.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::NotificationConfig;
    use common::domain::{
        DeviceService, ErrorKind, MockAddressableRepository, MockAssociateNotifier,
        MockDeviceProfileRepository, MockDeviceReportRepository, MockDeviceRepository,
        MockDeviceServiceRepository, MockNotificationSink,
    };

    struct Mocks {
        devices: MockDeviceRepository,
        addressables: MockAddressableRepository,
        device_services: MockDeviceServiceRepository,
        device_profiles: MockDeviceProfileRepository,
        device_reports: MockDeviceReportRepository,
        associates: MockAssociateNotifier,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                devices: MockDeviceRepository::new(),
                addressables: MockAddressableRepository::new(),
                device_services: MockDeviceServiceRepository::new(),
                device_profiles: MockDeviceProfileRepository::new(),
                device_reports: MockDeviceReportRepository::new(),
                associates: MockAssociateNotifier::new(),
            }
        }

        /// Owning service lookups succeed and associate calls are expected
        /// exactly `times` times
        fn expect_notifications(&mut self, times: usize) {
            self.device_services
                .expect_get_device_service_by_id()
                .times(times)
                .returning(|id| {
                    Ok(Some(DeviceService {
                        id: id.to_string(),
                        name: "svc1".to_string(),
                        ..Default::default()
                    }))
                });
            self.associates
                .expect_notify_associates()
                .times(times)
                .returning(|_, _, _, _| Ok(()));
        }

        fn into_service(self, read_max_limit: usize) -> DeviceManagementService {
            let repositories = MetadataRepositories {
                devices: Arc::new(self.devices),
                addressables: Arc::new(self.addressables),
                device_services: Arc::new(self.device_services),
                device_profiles: Arc::new(self.device_profiles),
                device_reports: Arc::new(self.device_reports),
            };
            let notifier = Arc::new(DeviceNotifier::new(
                NotificationConfig {
                    post_device_changes: false,
                    ..Default::default()
                },
                Arc::new(MockNotificationSink::new()),
                Arc::new(self.associates),
                &repositories,
            ));
            DeviceManagementService::new(repositories, notifier, QueryConfig { read_max_limit })
        }
    }

    fn stored(name: &str) -> Device {
        Device {
            id: format!("{}-id", name),
            name: name.to_string(),
            service: DeviceService {
                id: "svc-id".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_device_rejects_empty_name() {
        let service = Mocks::new().into_service(10);

        let result = service
            .create_device(CreateDeviceRequest::default())
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_set_operating_state_invalid_value_skips_lookup() {
        let mut mocks = Mocks::new();
        mocks.devices.expect_get_device_by_id().never();
        mocks.devices.expect_update_device().never();
        let service = mocks.into_service(10);

        let result = service
            .set_operating_state(SetOperatingStateRequest {
                device: DeviceLocator::Id("d1-id".to_string()),
                operating_state: "RUNNING".to_string(),
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, DomainError::InvalidOperatingState(_)));
    }

    #[tokio::test]
    async fn test_set_admin_state_persists_and_notifies() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_name()
            .withf(|name| name == "d1")
            .times(1)
            .return_once(|_| Ok(Some(stored("d1"))));
        mocks
            .devices
            .expect_update_device()
            .withf(|d: &Device| d.admin_state == AdminState::Locked)
            .times(1)
            .return_once(Ok);
        mocks.expect_notifications(1);
        let service = mocks.into_service(10);

        let device = service
            .set_admin_state(SetAdminStateRequest {
                device: DeviceLocator::Name("d1".to_string()),
                admin_state: "locked".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(device.admin_state, AdminState::Locked);
    }

    #[tokio::test]
    async fn test_set_last_connected_without_notify() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_id()
            .times(1)
            .return_once(|_| Ok(Some(stored("d1"))));
        mocks
            .devices
            .expect_update_device()
            .withf(|d: &Device| d.last_connected == 1_700_000_000_000)
            .times(1)
            .return_once(Ok);
        mocks.expect_notifications(0);
        let service = mocks.into_service(10);

        let device = service
            .set_last_connected(SetLastConnectedRequest {
                device: DeviceLocator::Id("d1-id".to_string()),
                last_connected: "1700000000000".to_string(),
                notify: Some("false".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(device.last_connected, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_set_last_reported_rejects_bad_timestamp() {
        let mut mocks = Mocks::new();
        mocks.devices.expect_get_device_by_id().never();
        let service = mocks.into_service(10);

        let err = service
            .set_last_reported(SetLastReportedRequest {
                device: DeviceLocator::Id("d1-id".to_string()),
                last_reported: "soon".to_string(),
                notify: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_list_devices_over_limit_is_too_large() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_list_devices()
            .times(1)
            .return_once(|| Ok(vec![stored("d1"), stored("d2"), stored("d3")]));
        let service = mocks.into_service(2);

        let err = service.list_devices().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooLarge);
        assert!(matches!(err, DomainError::ResultLimitExceeded(3)));
    }

    #[tokio::test]
    async fn test_list_devices_at_limit() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_list_devices_with_label()
            .withf(|label| label == "hvac")
            .times(1)
            .return_once(|_| Ok(vec![stored("d1"), stored("d2")]));
        let service = mocks.into_service(2);

        let devices = service.list_devices_with_label("hvac").await.unwrap();
        assert_eq!(devices.len(), 2);
    }

    #[tokio::test]
    async fn test_list_devices_by_unknown_service() {
        let mut mocks = Mocks::new();
        mocks
            .device_services
            .expect_get_device_service_by_name()
            .times(1)
            .return_once(|_| Ok(None));
        mocks.devices.expect_list_devices_by_service_id().never();
        let service = mocks.into_service(10);

        let err = service
            .list_devices_by_service(&ReferenceHint::by_name("svc9"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err, DomainError::DeviceServiceNotFound(name) if name == "svc9"));
    }

    #[tokio::test]
    async fn test_check_device_tries_name_then_id() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_name()
            .withf(|name| name == "d1-id")
            .times(1)
            .return_once(|_| Ok(None));
        mocks
            .devices
            .expect_get_device_by_id()
            .withf(|id| id == "d1-id")
            .times(1)
            .return_once(|_| Ok(Some(stored("d1"))));
        let service = mocks.into_service(10);

        let device = service.check_device("d1-id").await.unwrap();
        assert_eq!(device.name, "d1");
    }

    #[tokio::test]
    async fn test_check_device_malformed_id_is_not_found() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_name()
            .times(1)
            .return_once(|_| Ok(None));
        mocks
            .devices
            .expect_get_device_by_id()
            .times(1)
            .return_once(|id| Err(DomainError::InvalidIdentifier(id.to_string())));
        let service = mocks.into_service(10);

        let err = service.check_device("nothing").await.unwrap_err();
        assert!(matches!(err, DomainError::DeviceNotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_locator_skips_registry() {
        let mut mocks = Mocks::new();
        mocks.devices.expect_get_device_by_id().never();
        mocks.devices.expect_get_device_by_name().never();
        let service = mocks.into_service(10);

        let err = service
            .get_device(DeviceLocator::Id(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = service.check_device(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_delete_unknown_device() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_name()
            .times(1)
            .return_once(|_| Ok(None));
        mocks
            .device_reports
            .expect_list_device_reports_by_device_name()
            .never();
        let service = mocks.into_service(10);

        let err = service
            .delete_device(DeviceLocator::Name("ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_reports_associate_failure_after_commit() {
        let mut mocks = Mocks::new();
        mocks
            .devices
            .expect_get_device_by_id()
            .times(1)
            .return_once(|_| Ok(Some(stored("d1"))));
        mocks
            .devices
            .expect_update_device()
            .times(1)
            .return_once(Ok);
        mocks
            .device_services
            .expect_get_device_service_by_id()
            .times(1)
            .return_once(|_| Ok(Some(DeviceService::default())));
        mocks
            .associates
            .expect_notify_associates()
            .times(1)
            .return_once(|_, _, _, _| Err(anyhow::anyhow!("503 Service Unavailable")));
        let service = mocks.into_service(10);

        let err = service
            .update_device(UpdateDeviceRequest {
                id: Some("d1-id".to_string()),
                description: Some("updated".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AssociateNotificationFailed(_)));
    }
}
