use common::domain::{
    AdminState, DeviceLocator, DomainError, DomainResult, OperatingState, ReferenceHint,
};
use garde::Validate;

/// Service request for admitting a new device
///
/// Foreign references are hints: each is resolved by ID first, then by name,
/// and everything else the caller sent for them is ignored.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateDeviceRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub description: String,
    #[garde(skip)]
    pub labels: Vec<String>,
    #[garde(skip)]
    pub location: Option<serde_json::Value>,
    #[garde(skip)]
    pub addressable: ReferenceHint,
    #[garde(skip)]
    pub service: ReferenceHint,
    #[garde(skip)]
    pub profile: ReferenceHint,
    #[garde(skip)]
    pub operating_state: Option<OperatingState>,
    #[garde(skip)]
    pub admin_state: Option<AdminState>,
    #[garde(skip)]
    pub last_connected: i64,
    #[garde(skip)]
    pub last_reported: i64,
    #[garde(skip)]
    pub origin: i64,
}

/// Partial update of a stored device
///
/// `None` leaves the stored field alone; `Some` overwrites it, zero and empty
/// values included. The device is located by `id`, falling back to `name`.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateDeviceRequest {
    #[garde(skip)]
    pub id: Option<String>,
    #[garde(length(min = 1))]
    pub name: Option<String>,
    #[garde(skip)]
    pub addressable: Option<ReferenceHint>,
    #[garde(skip)]
    pub service: Option<ReferenceHint>,
    #[garde(skip)]
    pub profile: Option<ReferenceHint>,
    #[garde(skip)]
    pub admin_state: Option<AdminState>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub labels: Option<Vec<String>>,
    #[garde(skip)]
    pub last_connected: Option<i64>,
    #[garde(skip)]
    pub last_reported: Option<i64>,
    #[garde(skip)]
    pub location: Option<serde_json::Value>,
    #[garde(skip)]
    pub operating_state: Option<OperatingState>,
    #[garde(skip)]
    pub origin: Option<i64>,
}

#[derive(Debug, Clone, Validate)]
pub struct SetOperatingStateRequest {
    #[garde(skip)]
    pub device: DeviceLocator,
    #[garde(length(min = 1))]
    pub operating_state: String,
}

#[derive(Debug, Clone, Validate)]
pub struct SetAdminStateRequest {
    #[garde(skip)]
    pub device: DeviceLocator,
    #[garde(length(min = 1))]
    pub admin_state: String,
}

/// Last-connected update; values arrive as they were written on the wire
#[derive(Debug, Clone, Validate)]
pub struct SetLastConnectedRequest {
    #[garde(skip)]
    pub device: DeviceLocator,
    #[garde(length(min = 1))]
    pub last_connected: String,
    #[garde(skip)]
    pub notify: Option<String>,
}

/// Last-reported update; values arrive as they were written on the wire
#[derive(Debug, Clone, Validate)]
pub struct SetLastReportedRequest {
    #[garde(skip)]
    pub device: DeviceLocator,
    #[garde(length(min = 1))]
    pub last_reported: String,
    #[garde(skip)]
    pub notify: Option<String>,
}

/// Parse an epoch-millisecond parameter
pub fn parse_timestamp(field: &str, raw: &str) -> DomainResult<i64> {
    raw.trim().parse::<i64>().map_err(|e| {
        DomainError::InvalidParameter(format!("{} '{}' is not a timestamp: {}", field, raw, e))
    })
}

/// Parse an optional notify flag; an absent flag means notify
pub fn parse_notify_flag(raw: Option<&str>) -> DomainResult<bool> {
    match raw.map(str::trim) {
        None => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(DomainError::InvalidParameter(format!(
            "notify '{}' is not a boolean",
            v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::validation::validate;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("lastConnected", "1700000000123").unwrap(),
            1_700_000_000_123
        );
        assert!(matches!(
            parse_timestamp("lastConnected", "yesterday"),
            Err(DomainError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_parse_notify_flag() {
        assert!(parse_notify_flag(None).unwrap());
        assert!(parse_notify_flag(Some("TRUE")).unwrap());
        assert!(!parse_notify_flag(Some("false")).unwrap());
        assert!(matches!(
            parse_notify_flag(Some("maybe")),
            Err(DomainError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let request = UpdateDeviceRequest {
            id: Some("dev-1".to_string()),
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            validate(&request),
            Err(DomainError::ValidationError(_))
        ));

        let omitted = UpdateDeviceRequest {
            id: Some("dev-1".to_string()),
            ..Default::default()
        };
        assert!(validate(&omitted).is_ok());
    }
}
