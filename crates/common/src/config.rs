use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetadataConfig {
    /// Maximum number of records a bulk listing may return
    #[serde(default = "default_read_max_limit")]
    pub read_max_limit: usize,

    // Device change notifications
    /// Post device changes to the notification sink
    #[serde(default = "default_notification_post_device_changes")]
    pub notification_post_device_changes: bool,

    /// Slug prefix; the current epoch millis is appended
    #[serde(default = "default_notification_slug")]
    pub notification_slug: String,

    /// Content prefix; the device name and action are appended
    #[serde(default = "default_notification_content")]
    pub notification_content: String,

    #[serde(default = "default_notification_description")]
    pub notification_description: String,

    #[serde(default = "default_notification_label")]
    pub notification_label: String,

    #[serde(default = "default_notification_sender")]
    pub notification_sender: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Subject notification records are published on
    #[serde(default = "default_nats_notifications_subject")]
    pub nats_notifications_subject: String,

    #[serde(default = "default_nats_connect_timeout_secs")]
    pub nats_connect_timeout_secs: u64,

    // Device service callbacks
    /// Per-request timeout for device service callbacks in seconds
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,
}

fn default_read_max_limit() -> usize {
    1000
}

// Notification defaults
fn default_notification_post_device_changes() -> bool {
    true
}

fn default_notification_slug() -> String {
    "device-change-".to_string()
}

fn default_notification_content() -> String {
    "Device update: ".to_string()
}

fn default_notification_description() -> String {
    "Metadata device notice".to_string()
}

fn default_notification_label() -> String {
    "metadata".to_string()
}

fn default_notification_sender() -> String {
    "core-metadata".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_notifications_subject() -> String {
    "notifications.device".to_string()
}

fn default_nats_connect_timeout_secs() -> u64 {
    10
}

fn default_callback_timeout_secs() -> u64 {
    5
}

impl MetadataConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("METADATA"))
            .build()?
            .try_deserialize()
    }

    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            post_device_changes: self.notification_post_device_changes,
            slug_prefix: self.notification_slug.clone(),
            content_prefix: self.notification_content.clone(),
            description: self.notification_description.clone(),
            label: self.notification_label.clone(),
            sender: self.notification_sender.clone(),
        }
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            read_max_limit: self.read_max_limit,
        }
    }

    pub fn nats_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.nats_connect_timeout_secs)
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }
}

/// Settings for the external device change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub post_device_changes: bool,
    pub slug_prefix: String,
    pub content_prefix: String,
    pub description: String,
    pub label: String,
    pub sender: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            post_device_changes: default_notification_post_device_changes(),
            slug_prefix: default_notification_slug(),
            content_prefix: default_notification_content(),
            description: default_notification_description(),
            label: default_notification_label(),
            sender: default_notification_sender(),
        }
    }
}

/// Limits applied to bulk listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub read_max_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            read_max_limit: default_read_max_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touch process environment and must not interleave
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::remove_var("METADATA_READ_MAX_LIMIT");
            std::env::remove_var("METADATA_NOTIFICATION_POST_DEVICE_CHANGES");
        }

        let config = MetadataConfig::from_env().unwrap();
        assert_eq!(config.read_max_limit, 1000);
        assert!(config.notification_post_device_changes);
        assert_eq!(config.notification_config(), NotificationConfig::default());
        assert_eq!(config.callback_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_log_level_left_to_host() {
        let _lock = TEST_LOCK.lock().unwrap();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::set_var("METADATA_LOG_LEVEL", "debug");
        }

        let config = MetadataConfig::from_env();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::remove_var("METADATA_LOG_LEVEL");
        }

        let value = serde_json::to_value(config.unwrap()).unwrap();
        assert!(value.get("log_level").is_none());
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::set_var("METADATA_READ_MAX_LIMIT", "25");
            std::env::set_var("METADATA_NOTIFICATION_POST_DEVICE_CHANGES", "false");
        }

        let config = MetadataConfig::from_env().unwrap();
        assert_eq!(config.query_config().read_max_limit, 25);
        assert!(!config.notification_config().post_device_changes);

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::remove_var("METADATA_READ_MAX_LIMIT");
            std::env::remove_var("METADATA_NOTIFICATION_POST_DEVICE_CHANGES");
        }
    }
}
