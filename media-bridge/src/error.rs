use legacy_browser::BridgeError;
use media_session::HandlerError;
use notification_manager::NotificationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Legacy bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Session handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
