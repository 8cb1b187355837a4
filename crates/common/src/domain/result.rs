use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device service not found: {0}")]
    DeviceServiceNotFound(String),

    #[error("Device profile not found: {0}")]
    DeviceProfileNotFound(String),

    #[error("Addressable not found: {0}")]
    AddressableNotFound(String),

    #[error("Duplicate name for device: {0}")]
    DeviceNameConflict(String),

    #[error("Missing device association: {0}")]
    MissingAssociation(String),

    #[error("Missing device state: {0}")]
    MissingDeviceState(String),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Invalid operating state: {0}")]
    InvalidOperatingState(String),

    #[error("Invalid admin state: {0}")]
    InvalidAdminState(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Max limit exceeded: {0} results")]
    ResultLimitExceeded(usize),

    #[error("Associate notification failed: {0}")]
    AssociateNotificationFailed(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Caller-facing classification of a [`DomainError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ReferenceNotFound,
    InvalidInput,
    TooLarge,
    StoreUnavailable,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::DeviceNotFound(_)
            | DomainError::DeviceServiceNotFound(_)
            | DomainError::DeviceProfileNotFound(_)
            | DomainError::AddressableNotFound(_) => ErrorKind::NotFound,

            DomainError::DeviceNameConflict(_)
            | DomainError::MissingAssociation(_)
            | DomainError::MissingDeviceState(_) => ErrorKind::Conflict,

            DomainError::ReferenceNotFound(_) => ErrorKind::ReferenceNotFound,

            DomainError::InvalidOperatingState(_)
            | DomainError::InvalidAdminState(_)
            | DomainError::InvalidParameter(_)
            | DomainError::InvalidIdentifier(_)
            | DomainError::ValidationError(_) => ErrorKind::InvalidInput,

            DomainError::ResultLimitExceeded(_) => ErrorKind::TooLarge,

            DomainError::RepositoryError(_) => ErrorKind::StoreUnavailable,

            // Raised after the mutation has already been committed
            DomainError::AssociateNotificationFailed(_) => ErrorKind::StoreUnavailable,
        }
    }
}
