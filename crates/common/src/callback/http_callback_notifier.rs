use crate::domain::{AssociateNotifier, ChangeAction, DeviceService, EntityType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Body posted to a device service callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

/// HTTP method announcing each kind of change
pub fn callback_method(action: ChangeAction) -> Method {
    match action {
        ChangeAction::Created => Method::POST,
        ChangeAction::Updated => Method::PUT,
        ChangeAction::Deleted => Method::DELETE,
    }
}

/// Calls back each owning device service on its addressable
pub struct HttpCallbackNotifier {
    client: reqwest::Client,
}

impl HttpCallbackNotifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build callback HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssociateNotifier for HttpCallbackNotifier {
    #[instrument(skip(self, services), fields(service_count = services.len(), entity_id = %entity_id, action = %action))]
    async fn notify_associates(
        &self,
        services: Vec<DeviceService>,
        entity_id: &str,
        action: ChangeAction,
        entity_type: EntityType,
    ) -> Result<()> {
        let alert = CallbackAlert {
            id: entity_id.to_string(),
            entity_type,
        };

        for service in services {
            let url = service.addressable.callback_url();
            debug!(service = %service.name, url = %url, "calling back device service");

            let response = self
                .client
                .request(callback_method(action), &url)
                .json(&alert)
                .send()
                .await
                .with_context(|| format!("Callback to {} failed", service.name))?;

            if let Err(e) = response.error_for_status_ref() {
                warn!(service = %service.name, status = %response.status(), "callback rejected");
                return Err(e).with_context(|| format!("Callback to {} rejected", service.name));
            }
        }

        Ok(())
    }
}
