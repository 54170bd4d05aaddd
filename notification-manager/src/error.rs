//! Error types for notification-manager

use thiserror::Error;

/// Errors from the notification coordinator and its worker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The platform refused a foreground transition
    ///
    /// This indicates a host misconfiguration, such as a service declared
    /// without the media playback foreground type. It stops the coordinator.
    #[error("Platform constraint violated: {0}")]
    PlatformConstraint(String),

    /// A required collaborator was not supplied to the builder
    #[error("Missing required component: {0}")]
    MissingComponent(&'static str),

    /// The worker is no longer receiving commands
    #[error("Notification worker disconnected")]
    WorkerDisconnected,

    /// The worker stopped after a fatal error
    #[error("Notification worker stopped: {0}")]
    WorkerStopped(String),

    /// The worker did not answer in time
    #[error("Notification worker did not respond within {0:?}")]
    Timeout(std::time::Duration),

    /// The worker runtime could not be created
    #[error("Failed to start notification worker: {0}")]
    RuntimeInit(String),
}

/// Result type for notification operations
pub type Result<T> = std::result::Result<T, NotificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = NotificationError::PlatformConstraint("no mediaPlayback type".to_string());
        assert_eq!(
            error.to_string(),
            "Platform constraint violated: no mediaPlayback type"
        );

        assert_eq!(
            NotificationError::MissingComponent("foreground service").to_string(),
            "Missing required component: foreground service"
        );
    }
}
