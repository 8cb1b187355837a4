use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Network location of a device or device service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressable {
    pub id: String,
    pub name: String,
    pub protocol: String,
    pub method: String,
    pub address: String,
    pub port: u16,
    pub path: String,
}

impl Addressable {
    /// URL a device service listens on for change callbacks
    pub fn callback_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol.to_lowercase(),
            self.address,
            self.port,
            self.path
        )
    }
}

/// Registry lookups for addressables
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AddressableRepository: Send + Sync {
    /// Get an addressable by ID
    async fn get_addressable_by_id(&self, id: &str) -> DomainResult<Option<Addressable>>;

    /// Get an addressable by its unique name
    async fn get_addressable_by_name(&self, name: &str) -> DomainResult<Option<Addressable>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url() {
        let addressable = Addressable {
            id: "a1".to_string(),
            name: "svc-addr".to_string(),
            protocol: "HTTP".to_string(),
            method: "POST".to_string(),
            address: "edgex-device-virtual".to_string(),
            port: 49990,
            path: "/api/v1/callback".to_string(),
        };

        assert_eq!(
            addressable.callback_url(),
            "http://edgex-device-virtual:49990/api/v1/callback"
        );
    }
}
