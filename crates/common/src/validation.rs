//! Request validation: garde rules for request structs, plus the checks
//! on device locators that garde cannot express on an enum.

use crate::domain::{DeviceLocator, DomainError};
use garde::{Report, Validate};

/// Validate a request, turning a garde report into `DomainError::ValidationError`
pub fn validate<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(format_report(&report)))
}

/// Reject a locator whose key is blank
pub fn validate_locator(locator: &DeviceLocator) -> Result<(), DomainError> {
    let field = match locator {
        DeviceLocator::Id(_) => "device id",
        DeviceLocator::Name(_) => "device name",
    };

    if locator.value().trim().is_empty() {
        return Err(DomainError::ValidationError(format!(
            "{}: must not be blank",
            field
        )));
    }
    Ok(())
}

fn format_report(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            let path = path.to_string();
            if path.is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
