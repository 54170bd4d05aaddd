//! Configuration for the notification manager

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::PlatformDescriptor;

/// Notification id used by the default provider
pub const DEFAULT_NOTIFICATION_ID: i32 = 1001;

/// Notification channel used by the default provider
pub const DEFAULT_CHANNEL_ID: &str = "default_channel_id";

/// Configuration for a [`NotificationManager`](crate::NotificationManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Capabilities of the platform the service runs on
    /// Default: api level 33
    pub platform: PlatformDescriptor,

    /// How long [`flush`](crate::NotificationManager::flush) waits for the worker
    /// Default: 5 seconds
    pub flush_timeout: Duration,

    /// Notification id for the default provider
    /// Default: 1001
    pub notification_id: i32,

    /// Notification channel for the default provider
    /// Default: "default_channel_id"
    pub channel_id: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            platform: PlatformDescriptor::default(),
            flush_timeout: Duration::from_secs(5),
            notification_id: DEFAULT_NOTIFICATION_ID,
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a specific platform api level
    pub fn for_api_level(api_level: u32) -> Self {
        Self {
            platform: PlatformDescriptor::new(api_level),
            ..Default::default()
        }
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn with_notification_id(mut self, notification_id: i32) -> Self {
        self.notification_id = notification_id;
        self
    }
}
