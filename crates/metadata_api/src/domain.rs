mod cascade_deleter;
mod creation_validator;
mod device_management_service;
mod device_notifier;
mod device_requests;
mod field_merge;
mod reference_resolver;
mod repositories;

pub use cascade_deleter::*;
pub use creation_validator::*;
pub use device_management_service::*;
pub use device_notifier::*;
pub use device_requests::*;
pub use field_merge::*;
pub use reference_resolver::*;
pub use repositories::*;
