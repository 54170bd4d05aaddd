//! Service configuration
//!
//! Combines the bridge and notification settings and loads them from JSON.
//! Missing sections and fields fall back to their defaults.

use std::path::Path;

use legacy_browser::BridgeConfig;
use notification_manager::NotificationConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// Configuration for a [`MediaLibraryService`](crate::MediaLibraryService)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bridge: BridgeConfig,
    pub notification: NotificationConfig,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = notification;
        self
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ServiceError::Config(format!("Invalid service config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        if self.notification.flush_timeout.is_zero() {
            return Err(ServiceError::Config(
                "Flush timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
