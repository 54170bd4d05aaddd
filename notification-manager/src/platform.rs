//! Platform foreground-service contract
//!
//! The coordinator never talks to the operating system directly. It drives a
//! [`ForegroundService`] supplied by the host, choosing the version-specific
//! entry points through a [`ForegroundPolicy`](crate::ForegroundPolicy).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::{Notification, NotificationId};

/// Capabilities of the platform, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub api_level: u32,
}

impl PlatformDescriptor {
    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    pub fn at_least(&self, api_level: u32) -> bool {
        self.api_level >= api_level
    }
}

impl Default for PlatformDescriptor {
    fn default() -> Self {
        Self::new(33)
    }
}

/// Foreground service type declared when promoting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForegroundServiceType {
    MediaPlayback,
}

/// How to leave the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopForegroundMode {
    /// Leave the foreground and remove the notification
    Remove,
    /// Leave the foreground and keep the notification
    Detach,
    /// Single-flag call of older platforms
    Legacy { remove_notification: bool },
}

/// The platform refused a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

/// Host service entry points used by the coordinator
pub trait ForegroundService: Send + Sync + 'static {
    /// Make sure the host service is started
    fn start_foreground_service(&self);

    /// Promote the service to the foreground with `notification`
    fn start_foreground(
        &self,
        notification_id: NotificationId,
        notification: &Notification,
        service_type: Option<ForegroundServiceType>,
    ) -> Result<(), PlatformError>;

    fn stop_foreground(&self, mode: StopForegroundMode);

    /// Post or update a notification without promoting
    fn notify(&self, notification_id: NotificationId, notification: &Notification);

    fn cancel(&self, notification_id: NotificationId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let platform = PlatformDescriptor::new(29);
        assert!(platform.at_least(24));
        assert!(platform.at_least(29));
        assert!(!platform.at_least(30));
        assert_eq!(PlatformDescriptor::default().api_level, 33);
    }
}
