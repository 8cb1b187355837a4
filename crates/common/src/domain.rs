mod addressable;
mod device;
mod device_profile;
mod device_report;
mod device_service;
mod notification;
mod reference;
mod result;

pub use addressable::*;
pub use device::*;
pub use device_profile::*;
pub use device_report::*;
pub use device_service::*;
pub use notification::*;
pub use reference::*;
pub use result::*;
