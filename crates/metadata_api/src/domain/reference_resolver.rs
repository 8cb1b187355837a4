use common::domain::{
    Addressable, AddressableRepository, DeviceProfile, DeviceProfileRepository, DeviceService,
    DeviceServiceRepository, DomainError, DomainResult, ReferenceHint, ReferenceKind,
};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::domain::MetadataRepositories;

/// Look a record up by primary key, then by unique name.
///
/// The ID side is tried first and only when non-empty. Any ID-side failure,
/// malformed or not, falls through to the name side. A backend error is
/// returned only when the name side cannot answer instead: it failed too, or
/// there was no name to try. `Ok(None)` means neither key matched.
pub(crate) async fn find_by_id_then_name<'a, T, ById, IdFut, ByName, NameFut>(
    id: &'a str,
    name: &'a str,
    by_id: ById,
    by_name: ByName,
) -> DomainResult<Option<T>>
where
    ById: FnOnce(&'a str) -> IdFut,
    IdFut: Future<Output = DomainResult<Option<T>>>,
    ByName: FnOnce(&'a str) -> NameFut,
    NameFut: Future<Output = DomainResult<Option<T>>>,
{
    let mut id_error = None;

    if !id.is_empty() {
        match by_id(id).await {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => debug!(id = %id, "no match by id"),
            Err(DomainError::InvalidIdentifier(_)) => debug!(id = %id, "malformed id"),
            Err(e) => {
                debug!(id = %id, error = %e, "lookup by id failed");
                id_error = Some(e);
            }
        }
    }

    if !name.is_empty() {
        return match by_name(name).await {
            Ok(Some(found)) => Ok(Some(found)),
            Ok(None) | Err(DomainError::InvalidIdentifier(_)) => {
                debug!(name = %name, "no match by name");
                Ok(None)
            }
            Err(e) => Err(e),
        };
    }

    match id_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// A foreign record resolved from a [`ReferenceHint`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedReference {
    Addressable(Addressable),
    DeviceService(DeviceService),
    DeviceProfile(DeviceProfile),
}

/// Resolves the foreign records a device points at.
/// Every call is a fresh registry lookup; nothing is cached.
pub struct ReferenceResolver {
    addressables: Arc<dyn AddressableRepository>,
    device_services: Arc<dyn DeviceServiceRepository>,
    device_profiles: Arc<dyn DeviceProfileRepository>,
}

impl ReferenceResolver {
    pub fn new(repositories: &MetadataRepositories) -> Self {
        Self {
            addressables: repositories.addressables.clone(),
            device_services: repositories.device_services.clone(),
            device_profiles: repositories.device_profiles.clone(),
        }
    }

    /// Resolve a reference of any kind, failing with `ReferenceNotFound`
    pub async fn resolve(
        &self,
        kind: ReferenceKind,
        hint: &ReferenceHint,
    ) -> DomainResult<ResolvedReference> {
        match kind {
            ReferenceKind::Addressable => self
                .resolve_addressable(hint)
                .await
                .map(ResolvedReference::Addressable),
            ReferenceKind::DeviceService => self
                .resolve_device_service(hint)
                .await
                .map(ResolvedReference::DeviceService),
            ReferenceKind::DeviceProfile => self
                .resolve_device_profile(hint)
                .await
                .map(ResolvedReference::DeviceProfile),
        }
    }

    pub async fn resolve_addressable(&self, hint: &ReferenceHint) -> DomainResult<Addressable> {
        let repo = &self.addressables;
        find_by_id_then_name(
            hint.id.as_str(),
            hint.name.as_str(),
            |id| repo.get_addressable_by_id(id),
            |name| repo.get_addressable_by_name(name),
        )
        .await?
        .ok_or_else(|| not_found(ReferenceKind::Addressable))
    }

    pub async fn resolve_device_service(
        &self,
        hint: &ReferenceHint,
    ) -> DomainResult<DeviceService> {
        let repo = &self.device_services;
        find_by_id_then_name(
            hint.id.as_str(),
            hint.name.as_str(),
            |id| repo.get_device_service_by_id(id),
            |name| repo.get_device_service_by_name(name),
        )
        .await?
        .ok_or_else(|| not_found(ReferenceKind::DeviceService))
    }

    pub async fn resolve_device_profile(
        &self,
        hint: &ReferenceHint,
    ) -> DomainResult<DeviceProfile> {
        let repo = &self.device_profiles;
        find_by_id_then_name(
            hint.id.as_str(),
            hint.name.as_str(),
            |id| repo.get_device_profile_by_id(id),
            |name| repo.get_device_profile_by_name(name),
        )
        .await?
        .ok_or_else(|| not_found(ReferenceKind::DeviceProfile))
    }
}

fn not_found(kind: ReferenceKind) -> DomainError {
    DomainError::ReferenceNotFound(kind.to_string())
}
